use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

/// Review state of an expense record. The set is closed: anything else is
/// rejected at the parse boundary with `ApiError::InvalidStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            _ => Err(ApiError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_path: String,
    pub extracted_fields: HashMap<String, String>,
    pub status: ExpenseStatus,
    pub hr_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(
        user_id: Uuid,
        image_path: String,
        extracted_fields: HashMap<String, String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            image_path,
            extracted_fields,
            status: ExpenseStatus::Pending,
            hr_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a review decision. Any status may move to any status,
    /// including itself. Notes are tri-state: `None` preserves the existing
    /// notes, a blank string clears them, anything else replaces them with
    /// the trimmed text. `updated_at` is refreshed on every call.
    pub fn review(&mut self, status: ExpenseStatus, notes: Option<&str>, now: DateTime<Utc>) {
        self.status = status;
        if let Some(notes) = notes {
            self.hr_notes = normalize_notes(notes);
        }
        self.updated_at = now;
    }
}

/// Blank or whitespace-only notes collapse to `None`.
pub fn normalize_notes(notes: &str) -> Option<String> {
    let trimmed = notes.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, FromRow)]
pub struct ExpenseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_path: String,
    pub extracted_data: Json<HashMap<String, String>>,
    pub status: String,
    pub hr_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpenseRow {
    pub fn into_record(self) -> Result<ExpenseRecord, sqlx::Error> {
        let status = self
            .status
            .parse::<ExpenseStatus>()
            .map_err(|_| sqlx::Error::ColumnDecode {
                index: "status".into(),
                source: format!("unknown expense status '{}'", self.status).into(),
            })?;

        Ok(ExpenseRecord {
            id: self.id,
            user_id: self.user_id,
            image_path: self.image_path,
            extracted_fields: self.extracted_data.0,
            status,
            hr_notes: self.hr_notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// HR listings join the owner's email onto each row.
#[derive(Debug, FromRow)]
pub struct ExpenseWithOwnerRow {
    #[sqlx(flatten)]
    pub expense: ExpenseRow,
    pub user_email: String,
}

impl ExpenseWithOwnerRow {
    pub fn into_record(self) -> Result<(ExpenseRecord, String), sqlx::Error> {
        Ok((self.expense.into_record()?, self.user_email))
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub image_path: String,
    pub extracted_data: HashMap<String, String>,
    pub status: ExpenseStatus,
    pub hr_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl From<ExpenseRecord> for ExpenseResponse {
    fn from(record: ExpenseRecord) -> Self {
        Self {
            expense_id: record.id,
            user_id: record.user_id,
            image_path: record.image_path,
            extracted_data: record.extracted_fields,
            status: record.status,
            hr_notes: record.hr_notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
            user_email: None,
        }
    }
}

impl ExpenseResponse {
    pub fn with_owner(record: ExpenseRecord, email: String) -> Self {
        Self {
            user_email: Some(email),
            ..Self::from(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_record() -> ExpenseRecord {
        ExpenseRecord::new(
            Uuid::new_v4(),
            "uploads/expenses/bill.jpg".to_string(),
            HashMap::from([("Bill Amount".to_string(), "100".to_string())]),
        )
    }

    #[test]
    fn status_parses_the_closed_set_only() {
        assert_eq!("pending".parse::<ExpenseStatus>().unwrap(), ExpenseStatus::Pending);
        assert_eq!("approved".parse::<ExpenseStatus>().unwrap(), ExpenseStatus::Approved);
        assert_eq!("Rejected".parse::<ExpenseStatus>().unwrap(), ExpenseStatus::Rejected);
        assert!("archived".parse::<ExpenseStatus>().is_err());
        assert!("".parse::<ExpenseStatus>().is_err());
    }

    #[test]
    fn new_records_start_pending_without_notes() {
        let record = sample_record();
        assert_eq!(record.status, ExpenseStatus::Pending);
        assert!(record.hr_notes.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn review_reaches_every_status_from_every_status() {
        let targets = [
            ExpenseStatus::Pending,
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected,
        ];
        for from in targets {
            for to in targets {
                let mut record = sample_record();
                record.review(from, None, Utc::now());
                record.review(to, None, Utc::now());
                assert_eq!(record.status, to);
            }
        }
    }

    #[test]
    fn review_is_idempotent_and_refreshes_updated_at() {
        let mut record = sample_record();
        let first = record.created_at + Duration::hours(1);
        let second = first + Duration::hours(1);

        record.review(ExpenseStatus::Approved, Some("ok"), first);
        assert_eq!(record.status, ExpenseStatus::Approved);
        assert_eq!(record.updated_at, first);

        record.review(ExpenseStatus::Approved, None, second);
        assert_eq!(record.status, ExpenseStatus::Approved);
        assert_eq!(record.updated_at, second);
        assert_eq!(record.hr_notes.as_deref(), Some("ok"));
    }

    #[test]
    fn omitted_notes_preserve_and_explicit_notes_override() {
        let mut record = sample_record();
        record.review(ExpenseStatus::Rejected, Some("missing receipt"), Utc::now());
        assert_eq!(record.hr_notes.as_deref(), Some("missing receipt"));

        record.review(ExpenseStatus::Pending, None, Utc::now());
        assert_eq!(record.hr_notes.as_deref(), Some("missing receipt"));

        record.review(ExpenseStatus::Approved, Some("resubmitted, fine"), Utc::now());
        assert_eq!(record.hr_notes.as_deref(), Some("resubmitted, fine"));
    }

    #[test]
    fn blank_notes_clear_existing_notes() {
        let mut record = sample_record();
        record.review(ExpenseStatus::Rejected, Some("duplicate claim"), Utc::now());
        record.review(ExpenseStatus::Pending, Some("   "), Utc::now());
        assert!(record.hr_notes.is_none());
    }

    #[test]
    fn notes_are_trimmed_on_write() {
        let mut record = sample_record();
        record.review(ExpenseStatus::Approved, Some("  within policy  "), Utc::now());
        assert_eq!(record.hr_notes.as_deref(), Some("within policy"));
    }

    #[test]
    fn row_with_unknown_status_fails_to_decode() {
        let row = ExpenseRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            image_path: "uploads/expenses/bill.jpg".into(),
            extracted_data: Json(HashMap::new()),
            status: "archived".into(),
            hr_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.into_record().is_err());
    }
}
