use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Database;
use crate::error::ApiError;
use crate::export;
use crate::extraction::{self, ExtractedFields};
use crate::handlers::csv_attachment;
use crate::middleware::get_current_user;
use crate::models::{ExpenseRecord, ExpenseResponse, ExpenseRow, ExpenseStatus};
use crate::responses::{success, ApiResponse};
use crate::stats::{summarize, ExpenseStatistics};
use crate::utils::parse_iso_datetime;

#[derive(Deserialize)]
pub struct ExpenseFilters {
    status: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateExpenseRequest {
    /// Reference to the already-stored bill image; upload and extraction
    /// happen upstream of this service.
    pub image_path: String,
    #[serde(default)]
    pub extracted_data: ExtractedFields,
}

#[derive(Serialize)]
pub struct ExpenseListData {
    pub expenses: Vec<ExpenseResponse>,
    pub count: usize,
}

pub async fn create_expense(
    State(db): State<Database>,
    headers: HeaderMap,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseResponse>>), ApiError> {
    let user = get_current_user(&headers, &db).await?;

    extraction::validate(&payload.extracted_data)?;

    let record = ExpenseRecord::new(user.id, payload.image_path, payload.extracted_data);

    sqlx::query(
        "INSERT INTO expenses (id, user_id, image_path, extracted_data, status, hr_notes, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(&record.image_path)
    .bind(sqlx::types::Json(&record.extracted_fields))
    .bind(record.status.as_str())
    .bind(&record.hr_notes)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&db)
    .await?;

    log::info!("Expense created: {} for user: {}", record.id, user.id);

    Ok((
        StatusCode::CREATED,
        success("Expense uploaded successfully", ExpenseResponse::from(record)),
    ))
}

pub async fn my_expenses(
    State(db): State<Database>,
    headers: HeaderMap,
    Query(filters): Query<ExpenseFilters>,
) -> Result<Json<ApiResponse<ExpenseListData>>, ApiError> {
    let user = get_current_user(&headers, &db).await?;

    let records = fetch_user_expenses(&db, user.id, &filters).await?;
    let count = records.len();
    let expenses = records.into_iter().map(ExpenseResponse::from).collect();

    Ok(success(
        "Expenses retrieved successfully",
        ExpenseListData { expenses, count },
    ))
}

pub async fn my_statistics(
    State(db): State<Database>,
    headers: HeaderMap,
    Query(filters): Query<ExpenseFilters>,
) -> Result<Json<ApiResponse<ExpenseStatistics>>, ApiError> {
    let user = get_current_user(&headers, &db).await?;

    let records = fetch_user_expenses(&db, user.id, &filters).await?;

    Ok(success(
        "Statistics retrieved successfully",
        summarize(&records),
    ))
}

pub async fn export_my_expenses(
    State(db): State<Database>,
    headers: HeaderMap,
    Query(filters): Query<ExpenseFilters>,
) -> Result<Response, ApiError> {
    let user = get_current_user(&headers, &db).await?;

    let records = fetch_user_expenses(&db, user.id, &filters).await?;
    if records.is_empty() {
        return Err(ApiError::NotFound("No expenses found to export".to_string()));
    }

    let body = export::user_expenses_csv(&records)?;
    let filename = format!("expenses_{}.csv", Utc::now().format("%Y%m%d"));

    Ok(csv_attachment(filename, body))
}

async fn fetch_user_expenses(
    db: &Database,
    user_id: Uuid,
    filters: &ExpenseFilters,
) -> Result<Vec<ExpenseRecord>, ApiError> {
    let status = match filters.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<ExpenseStatus>()?),
        _ => None,
    };

    let mut query: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
        "SELECT id, user_id, image_path, extracted_data, status, hr_notes, created_at, updated_at \
         FROM expenses WHERE user_id = ",
    );
    query.push_bind(user_id);

    if let Some(status) = status {
        query.push(" AND status = ");
        query.push_bind(status.as_str());
    }
    // Malformed date filters from the employee UI are ignored, not rejected
    if let Some(from) = filters.date_from.as_deref().and_then(parse_iso_datetime) {
        query.push(" AND created_at >= ");
        query.push_bind(from);
    }
    if let Some(to) = filters.date_to.as_deref().and_then(parse_iso_datetime) {
        query.push(" AND created_at <= ");
        query.push_bind(to);
    }
    query.push(" ORDER BY created_at DESC");

    let rows = query
        .build_query_as::<ExpenseRow>()
        .fetch_all(db)
        .await?;

    rows.into_iter()
        .map(|row| row.into_record().map_err(ApiError::from))
        .collect()
}
