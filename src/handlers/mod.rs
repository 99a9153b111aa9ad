pub mod expenses;
pub mod hr;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Service is healthy",
        "status": "ok"
    }))
}

pub(crate) fn csv_attachment(filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_responds_without_a_database() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/kharcha")
            .unwrap();
        let app = crate::create_router(pool);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn csv_attachment_sets_download_headers() {
        let response = super::csv_attachment("expenses_20240115.csv".to_string(), b"a,b\n".to_vec());
        let headers = response.headers();
        assert_eq!(headers["content-type"], "text/csv");
        assert_eq!(
            headers["content-disposition"],
            "attachment; filename=expenses_20240115.csv"
        );
    }
}
