use axum::Json;
use serde::Serialize;

/// Response envelope shared by every endpoint: `{ success, message, data? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_data() {
        let Json(body) = success("Expenses retrieved successfully", vec![1, 2, 3]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Expenses retrieved successfully");
        assert_eq!(value["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn envelope_omits_absent_data() {
        let body = ApiResponse::<()> {
            success: true,
            message: "ok".into(),
            data: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("data").is_none());
    }
}
