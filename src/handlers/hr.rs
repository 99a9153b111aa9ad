use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Database;
use crate::error::ApiError;
use crate::export;
use crate::handlers::csv_attachment;
use crate::handlers::expenses::ExpenseListData;
use crate::middleware::require_hr;
use crate::models::{
    normalize_notes, ExpenseRecord, ExpenseResponse, ExpenseRow, ExpenseStatus,
    ExpenseWithOwnerRow,
};
use crate::responses::{success, ApiResponse};
use crate::stats::{summarize, ExpenseStatistics};
use crate::utils::parse_iso_datetime;

#[derive(Deserialize)]
pub struct HrExpenseFilters {
    user_id: Option<String>,
    status: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkUpdateRequest {
    #[serde(default)]
    pub expense_ids: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct BulkUpdateData {
    pub updated_count: u64,
    pub status: ExpenseStatus,
}

pub async fn all_expenses(
    State(db): State<Database>,
    headers: HeaderMap,
    Query(filters): Query<HrExpenseFilters>,
) -> Result<Json<ApiResponse<ExpenseListData>>, ApiError> {
    require_hr(&headers, &db).await?;

    let records = fetch_all_expenses(&db, &filters).await?;
    let count = records.len();
    let expenses = records
        .into_iter()
        .map(|(record, email)| ExpenseResponse::with_owner(record, email))
        .collect();

    Ok(success(
        "Expenses retrieved successfully",
        ExpenseListData { expenses, count },
    ))
}

pub async fn statistics(
    State(db): State<Database>,
    headers: HeaderMap,
    Query(filters): Query<HrExpenseFilters>,
) -> Result<Json<ApiResponse<ExpenseStatistics>>, ApiError> {
    require_hr(&headers, &db).await?;

    let records = fetch_all_expenses(&db, &filters).await?;
    let stats = summarize(records.iter().map(|(record, _)| record));

    Ok(success("Statistics retrieved successfully", stats))
}

pub async fn update_expense_status(
    State(db): State<Database>,
    headers: HeaderMap,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ExpenseResponse>>, ApiError> {
    let reviewer = require_hr(&headers, &db).await?;

    let status = payload.status.parse::<ExpenseStatus>()?;

    let row = sqlx::query_as::<_, ExpenseRow>(
        "SELECT id, user_id, image_path, extracted_data, status, hr_notes, created_at, updated_at \
         FROM expenses WHERE id = $1",
    )
    .bind(expense_id)
    .fetch_optional(&db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    let mut record = row.into_record()?;
    record.review(status, payload.notes.as_deref(), Utc::now());

    sqlx::query("UPDATE expenses SET status = $1, hr_notes = $2, updated_at = $3 WHERE id = $4")
        .bind(record.status.as_str())
        .bind(&record.hr_notes)
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&db)
        .await?;

    log::info!(
        "Expense status updated: {} to {} by {} with notes: {}",
        record.id,
        record.status,
        reviewer.email,
        payload.notes.is_some()
    );

    Ok(success(review_message(status), ExpenseResponse::from(record)))
}

pub async fn bulk_update_status(
    State(db): State<Database>,
    headers: HeaderMap,
    Json(payload): Json<BulkUpdateRequest>,
) -> Result<Json<ApiResponse<BulkUpdateData>>, ApiError> {
    require_hr(&headers, &db).await?;

    let status = payload.status.parse::<ExpenseStatus>()?;

    // Malformed ids are skipped rather than failing the whole batch
    let ids: Vec<Uuid> = payload
        .expense_ids
        .iter()
        .filter_map(|raw| Uuid::parse_str(raw.trim()).ok())
        .collect();
    if ids.is_empty() {
        return Err(ApiError::Validation(
            "No valid expense IDs provided".to_string(),
        ));
    }

    let now = Utc::now();
    let result = if let Some(notes) = payload.notes.as_deref() {
        sqlx::query(
            "UPDATE expenses SET status = $1, hr_notes = $2, updated_at = $3 WHERE id = ANY($4)",
        )
        .bind(status.as_str())
        .bind(normalize_notes(notes))
        .bind(now)
        .bind(&ids)
        .execute(&db)
        .await?
    } else {
        sqlx::query("UPDATE expenses SET status = $1, updated_at = $2 WHERE id = ANY($3)")
            .bind(status.as_str())
            .bind(now)
            .bind(&ids)
            .execute(&db)
            .await?
    };

    let updated_count = result.rows_affected();
    log::info!("Bulk update: {updated_count} expenses updated to {status}");

    Ok(success(
        format!("Successfully updated {updated_count} expense(s)"),
        BulkUpdateData {
            updated_count,
            status,
        },
    ))
}

pub async fn export_all_expenses(
    State(db): State<Database>,
    headers: HeaderMap,
    Query(filters): Query<HrExpenseFilters>,
) -> Result<Response, ApiError> {
    require_hr(&headers, &db).await?;

    let records = fetch_all_expenses(&db, &filters).await?;
    if records.is_empty() {
        return Err(ApiError::NotFound("No expenses found to export".to_string()));
    }

    let body = export::hr_expenses_csv(&records)?;
    let filename = format!("all_expenses_{}.csv", Utc::now().format("%Y%m%d"));

    Ok(csv_attachment(filename, body))
}

fn review_message(status: ExpenseStatus) -> String {
    let verb = match status {
        ExpenseStatus::Approved => "approved",
        ExpenseStatus::Rejected => "rejected",
        ExpenseStatus::Pending => "set to pending",
    };
    format!("Expense {verb} successfully")
}

async fn fetch_all_expenses(
    db: &Database,
    filters: &HrExpenseFilters,
) -> Result<Vec<(ExpenseRecord, String)>, ApiError> {
    let status = match filters.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<ExpenseStatus>()?),
        _ => None,
    };

    let owner_id = match filters.user_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid user_id".to_string()))?,
        ),
        _ => None,
    };

    let date_from = parse_filter_date(filters.date_from.as_deref(), "date_from")?;
    let date_to = parse_filter_date(filters.date_to.as_deref(), "date_to")?;

    let mut query: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(
        "SELECT e.id, e.user_id, e.image_path, e.extracted_data, e.status, e.hr_notes, \
         e.created_at, e.updated_at, COALESCE(u.email, 'Unknown') AS user_email \
         FROM expenses e LEFT JOIN users u ON e.user_id = u.id WHERE 1 = 1",
    );

    if let Some(owner) = owner_id {
        query.push(" AND e.user_id = ");
        query.push_bind(owner);
    }
    if let Some(status) = status {
        query.push(" AND e.status = ");
        query.push_bind(status.as_str());
    }
    if let Some(from) = date_from {
        query.push(" AND e.created_at >= ");
        query.push_bind(from);
    }
    if let Some(to) = date_to {
        query.push(" AND e.created_at <= ");
        query.push_bind(to);
    }
    query.push(" ORDER BY e.created_at DESC");

    let rows = query
        .build_query_as::<ExpenseWithOwnerRow>()
        .fetch_all(db)
        .await?;

    rows.into_iter()
        .map(|row| row.into_record().map_err(ApiError::from))
        .collect()
}

// HR-side date filters are validated strictly, unlike the employee listing
fn parse_filter_date(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => parse_iso_datetime(value).map(Some).ok_or_else(|| {
            ApiError::Validation(format!(
                "Invalid {field} format. Use ISO format (YYYY-MM-DDTHH:MM:SS)"
            ))
        }),
    }
}
