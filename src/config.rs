use std::env;

/// Process configuration, read once at startup.
///
/// `DATABASE_URL` and `JWT_SECRET` are required; the server refuses to boot
/// without them so a misconfigured deployment fails fast instead of at the
/// first authenticated request.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let required = ["DATABASE_URL", "JWT_SECRET"];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(true))
            .collect();

        if !missing.is_empty() {
            return Err(format!(
                "Missing required environment variables: {}. Please set them in your environment or .env file.",
                missing.join(", ")
            ));
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a number, got '{raw}'"))?,
            Err(_) => 8000,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            database_url: env::var("DATABASE_URL").map_err(|e| e.to_string())?,
        })
    }
}
