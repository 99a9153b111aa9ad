use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::database::Database;
use crate::error::ApiError;
use crate::models::{User, UserRole};
use crate::utils::verify_token;

/// Caller identity resolved from the bearer token. Tokens are minted by the
/// external auth service; we only verify and check the account is still
/// active.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_hr(&self) -> bool {
        self.role == UserRole::Hr
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn get_current_user(
    headers: &HeaderMap,
    db: &Database,
) -> Result<CurrentUser, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;

    let claims = verify_token(token).map_err(|err| {
        log::warn!("Invalid token: {err}");
        ApiError::Unauthorized
    })?;

    let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| ApiError::Unauthorized)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = true")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(CurrentUser {
        id: user.id,
        role: UserRole::from_role_str(&user.role),
        email: user.email,
    })
}

pub async fn require_hr(headers: &HeaderMap, db: &Database) -> Result<CurrentUser, ApiError> {
    let user = get_current_user(headers, db).await?;
    if !user.is_hr() {
        return Err(ApiError::Forbidden);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_extracts_the_token_part() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_malformed_headers_yield_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with_auth("abc.def.ghi")), None);
        assert_eq!(bearer_token(&headers_with_auth("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with_auth("Bearer ")), None);
    }
}
