use crate::extraction::{extract_amount, CATEGORY_FIELD};
use crate::models::ExpenseRecord;

const COLUMNS: [&str; 8] = [
    "Date",
    "Vendor",
    "Bill Type",
    "Amount (INR)",
    "Status",
    "HR Notes",
    "Created At",
    "Updated At",
];

/// CSV for an employee's own records, column layout matching the dashboard
/// table. Amounts are exported as the parsed numeric value, not the raw
/// extracted string.
pub fn user_expenses_csv(records: &[ExpenseRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.write_record(base_columns(record))?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// CSV across all users; prepends the owner's email to every row.
pub fn hr_expenses_csv(records: &[(ExpenseRecord, String)]) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        let mut header = vec!["User Email".to_string()];
        header.extend(COLUMNS.iter().map(|c| c.to_string()));
        writer.write_record(&header)?;

        for (record, email) in records {
            let mut row = vec![email.clone()];
            row.extend(base_columns(record));
            writer.write_record(&row)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

fn base_columns(record: &ExpenseRecord) -> Vec<String> {
    let field = |key: &str| {
        record
            .extracted_fields
            .get(key)
            .cloned()
            .unwrap_or_default()
    };

    vec![
        field("Date"),
        field("Details"),
        field(CATEGORY_FIELD),
        extract_amount(&record.extracted_fields).to_string(),
        record.status.to_string(),
        record.hr_notes.clone().unwrap_or_default(),
        record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        record.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseStatus;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn record() -> ExpenseRecord {
        let created_at = "2024-01-15T10:30:00Z".parse::<DateTime<Utc>>().unwrap();
        ExpenseRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            image_path: "uploads/expenses/bill.jpg".to_string(),
            extracted_fields: HashMap::from([
                ("Date".to_string(), "15-01-2024".to_string()),
                ("Details".to_string(), "Airport cab".to_string()),
                ("Bill Type".to_string(), "cab".to_string()),
                ("Bill Amount".to_string(), "₹1,250.00".to_string()),
            ]),
            status: ExpenseStatus::Approved,
            hr_notes: Some("within policy".to_string()),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn user_export_has_expected_header_and_values() {
        let bytes = user_expenses_csv(&[record()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Date,Vendor,Bill Type,Amount (INR),Status,HR Notes,Created At,Updated At"
        );
        assert_eq!(
            lines.next().unwrap(),
            "15-01-2024,Airport cab,cab,1250.00,approved,within policy,2024-01-15 10:30:00,2024-01-15 10:30:00"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn hr_export_prepends_owner_email() {
        let bytes = hr_expenses_csv(&[(record(), "priya@example.com".to_string())]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert!(lines.next().unwrap().starts_with("User Email,Date,"));
        assert!(lines.next().unwrap().starts_with("priya@example.com,"));
    }

    #[test]
    fn missing_fields_export_as_empty_cells() {
        let mut r = record();
        r.extracted_fields.clear();
        r.hr_notes = None;
        let bytes = user_expenses_csv(&[r]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with(",,,0,approved,,"));
    }
}
