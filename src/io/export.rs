use chrono::NaiveDate;

use crate::model::task::Task;

/// CSV column header, fixed by the export data contract.
const CSV_HEADER: &str =
    "Title,Description,Priority,Category,Completed,Due Date,Time Spent (min),Tags,Created At";

/// Error importing a task file
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serialize the full task list as pretty-printed JSON, verbatim.
pub fn to_json(tasks: &[Task]) -> String {
    // Vec<Task> cannot fail to serialize
    serde_json::to_string_pretty(tasks).unwrap_or_else(|_| "[]".to_string())
}

/// Serialize the task list as CSV. Free-text columns are quoted, tags are
/// joined with `;` inside quotes, and a missing due date is an empty cell.
pub fn to_csv(tasks: &[Task]) -> String {
    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for task in tasks {
        lines.push(
            [
                quote(&task.title),
                quote(&task.description),
                task.priority.label().to_string(),
                quote(&task.category),
                task.completed.to_string(),
                task.due_date.map(|d| d.to_string()).unwrap_or_default(),
                task.time_spent.to_string(),
                quote(&task.tags.join(";")),
                task.created_at.to_rfc3339(),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

/// Decode an imported JSON file into typed tasks. Anything that is not an
/// array of task-shaped records is rejected; the caller leaves the list
/// unchanged on error.
pub fn parse_json(content: &str) -> Result<Vec<Task>, ImportError> {
    Ok(serde_json::from_str(content)?)
}

/// Default export filename, e.g. `tasks-2025-06-10.json`.
pub fn default_filename(today: NaiveDate, ext: &str) -> String {
    format!("tasks-{}.{}", today, ext)
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Task> {
        vec![
            Task {
                id: "100".into(),
                title: "Buy milk".into(),
                description: "2% or whole".into(),
                completed: false,
                priority: Priority::Low,
                category: "Personal".into(),
                due_date: Some("2025-06-12".parse().unwrap()),
                created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
                created_by: "You".into(),
                photos: vec![],
                time_spent: 5,
                tags: vec!["shopping".into(), "weekly".into()],
            },
            Task {
                id: "101".into(),
                title: "Say \"hi\"".into(),
                description: String::new(),
                completed: true,
                priority: Priority::High,
                category: String::new(),
                due_date: None,
                created_at: Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap(),
                created_by: "You".into(),
                photos: vec![],
                time_spent: 0,
                tags: vec![],
            },
        ]
    }

    #[test]
    fn csv_header_matches_contract() {
        let csv = to_csv(&[]);
        assert_eq!(
            csv,
            "Title,Description,Priority,Category,Completed,Due Date,Time Spent (min),Tags,Created At"
        );
    }

    #[test]
    fn csv_rows_quote_text_and_join_tags() {
        let csv = to_csv(&sample());
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            "\"Buy milk\",\"2% or whole\",low,\"Personal\",false,2025-06-12,5,\"shopping;weekly\",2025-06-01T08:00:00+00:00"
        );
        // Embedded quotes doubled, missing due date is an empty cell
        assert_eq!(
            rows[2],
            "\"Say \"\"hi\"\"\",\"\",high,\"\",true,,0,\"\",2025-06-02T09:30:00+00:00"
        );
    }

    #[test]
    fn json_round_trip_preserves_tasks() {
        let tasks = sample();
        let json = to_json(&tasks);
        let back = parse_json(&json).unwrap();
        assert_eq!(back, tasks);
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(parse_json("not json {{{").is_err());
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(parse_json(r#"{"tasks": []}"#).is_err());
        assert!(parse_json(r#"[{"title": "no id or createdAt"}]"#).is_err());
    }

    #[test]
    fn default_filename_uses_iso_date() {
        let today: NaiveDate = "2025-06-10".parse().unwrap();
        assert_eq!(default_filename(today, "json"), "tasks-2025-06-10.json");
        assert_eq!(default_filename(today, "csv"), "tasks-2025-06-10.csv");
    }
}
