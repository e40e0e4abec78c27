//! JSON and CSV renderings of a task list for download.

use chrono::{DateTime, Utc};
use csv::Writer;

use crate::error::AppError;
use crate::models::Task;

/// Upper bound on the number of tasks written to a single export.
pub const EXPORT_LIMIT: u32 = 10_000;

const CSV_HEADER: [&str; 10] = [
    "ID",
    "Title",
    "Description",
    "Completed",
    "Category",
    "Tags",
    "Due Date",
    "Reminder Date",
    "Created At",
    "Updated At",
];

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

pub fn to_json(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string_pretty(tasks)
        .map_err(|e| AppError::InternalServerError(format!("Failed to write JSON: {}", e)))
}

pub fn to_csv(tasks: &[Task]) -> Result<String, AppError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for task in tasks {
        writer.write_record([
            task.id.to_string(),
            task.title.clone(),
            task.description.clone().unwrap_or_default(),
            if task.completed { "Yes" } else { "No" }.to_string(),
            task.category.clone().unwrap_or_default(),
            task.tags.join(","),
            format_date(task.due_date),
            format_date(task.reminder_date),
            format_date(Some(task.created_at)),
            format_date(Some(task.updated_at)),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(format!("Failed to write CSV: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::InternalServerError(format!("CSV is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn task() -> Task {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        Task {
            id: 42,
            title: "Plan trip, part 1".to_string(),
            description: None,
            completed: true,
            category: Some("travel".to_string()),
            tags: vec!["summer".to_string(), "family".to_string()],
            due_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            reminder_date: None,
            owner_id: 1,
            created_at: created,
            updated_at: created,
            shared_with_user_ids: vec![2],
        }
    }

    #[test]
    fn test_csv_export() {
        let csv = to_csv(&[task()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines,
            vec![
                "ID,Title,Description,Completed,Category,Tags,Due Date,Reminder Date,Created At,Updated At",
                "42,\"Plan trip, part 1\",,Yes,travel,\"summer,family\",2024-06-01 00:00:00,,2024-05-01 08:30:00,2024-05-01 08:30:00",
            ]
        );
    }

    #[test]
    fn test_csv_export_empty_has_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_json_export_is_a_pretty_array() {
        let json = to_json(&[task()]).unwrap();
        assert!(json.starts_with("[\n"));

        let parsed: Vec<Task> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![task()]);
    }
}
