//! services/admin/src/console/render.rs
//!
//! Plain-text rendering of the students page, dialogs and chat transcript.

use student_admin_core::chat::{ChatMessage, Sender};
use student_admin_core::controller::PageState;
use student_admin_core::domain::{Class, RecordId, Student};
use student_admin_core::toast::{Toast, ToastKind};
use student_admin_core::validation::ValidationErrors;

const HEADERS: [&str; 6] = ["ID", "First Name", "Last Name", "Email", "Date of Birth", "Classes"];
const MISSING: &str = "N/A";

fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

fn class_labels(classes: &[Class]) -> String {
    if classes.is_empty() {
        return "No classes".to_string();
    }
    classes
        .iter()
        .map(Class::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn row(student: &Student) -> [String; 6] {
    [
        or_missing(&student.id.to_string()),
        or_missing(&student.first_name),
        or_missing(&student.last_name),
        or_missing(student.email.as_deref().unwrap_or_default()),
        student
            .date_of_birth
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| MISSING.to_string()),
        class_labels(&student.classes),
    ]
}

/// A fixed-width table of the given students.
pub fn students_table(students: &[Student]) -> String {
    if students.is_empty() {
        return "No students found. Type 'add' to create one.".to_string();
    }

    let rows: Vec<[String; 6]> = students.iter().map(row).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let rule = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut out = vec![line(&headers[..]), rule];
    out.extend(rows.iter().map(|r| line(&r[..])));
    out.join("\n")
}

pub fn pagination(page: &PageState) -> String {
    format!(
        "Page {} of {} ({} students)",
        page.current_page(),
        page.total_pages(),
        page.total_count()
    )
}

pub fn toast(toast: &Toast) -> String {
    let tag = match toast.kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
    };
    format!("[{}] {}", tag, toast.message)
}

pub fn load_error(message: &str) -> String {
    format!("Error loading students: {}\nType 'retry' to try again.", message)
}

pub fn validation_errors(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {}: {}", field, message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered class list used by the class picker. Selected ones are marked.
pub fn class_choices(classes: &[Class], selected: &[RecordId]) -> String {
    if classes.is_empty() {
        return "No classes available".to_string();
    }
    classes
        .iter()
        .enumerate()
        .map(|(index, class)| {
            let mark = if selected.contains(&class.id) { "x" } else { " " };
            format!("  {:>2}. [{}] {}", index + 1, mark, class.display_name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn chat_message(message: &ChatMessage) -> String {
    let who = match (message.sender, message.is_error) {
        (Sender::User, _) => "you",
        (Sender::Bot, false) => "assistant",
        (Sender::Bot, true) => "assistant (error)",
    };
    format!("[{}] {}: {}", message.timestamp.format("%H:%M"), who, message.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn student() -> Student {
        Student {
            id: RecordId::Int(7),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: None,
            date_of_birth: NaiveDate::from_ymd_opt(2001, 2, 3),
            classes: vec![
                Class { id: RecordId::Int(1), name: Some("Maths".into()) },
                Class { id: RecordId::Int(2), name: None },
            ],
        }
    }

    #[test]
    fn table_has_headers_and_placeholders() {
        let table = students_table(&[student()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID | First Name | Last Name | Email"));
        assert!(lines[2].contains("Ada"));
        assert!(lines[2].contains("N/A"));
        assert!(lines[2].contains("2001-02-03"));
        assert!(lines[2].ends_with("Maths, Class 2"));
    }

    #[test]
    fn empty_page_and_empty_classes() {
        assert!(students_table(&[]).starts_with("No students found"));
        let lonely = Student { classes: Vec::new(), ..student() };
        assert!(students_table(&[lonely]).ends_with("No classes"));
    }

    #[test]
    fn class_picker_marks_selection() {
        let classes = student().classes;
        let text = class_choices(&classes, &[RecordId::Int(2)]);
        assert_eq!(text, "   1. [ ] Maths\n   2. [x] Class 2");
    }

    #[test]
    fn toasts_are_tagged() {
        assert_eq!(toast(&Toast::error("boom")), "[error] boom");
        assert_eq!(toast(&Toast::success("done")), "[ok] done");
    }
}
