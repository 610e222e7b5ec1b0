use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::NaiveDate;
use serde::Serialize;

use crate::api::DataApi;
use crate::domain::repository::Storage;
use crate::domain::types::{NewClass, NewStudent};
use crate::domain::validation::{
    is_iso_date, validate_class_data, validate_email, validate_student_data,
};
use crate::error::AttendanceError;

pub const CLASS_IMPORT_TEMPLATE: &str = "Name,Subject,Schedule
Mathematics,Math,Mon/Wed/Fri 10:00 AM
Science,Physics,Tue/Thu 2:00 PM
English,Literature,Mon/Wed 9:00 AM
History,Social Studies,Tue/Thu 11:00 AM
Computer Science,Programming,Mon/Wed/Fri 3:00 PM
";

pub const CLASS_TEMPLATE_FILE_NAME: &str = "classes_import_template.csv";
pub const STUDENT_TEMPLATE_FILE_NAME: &str = "students_import_template.csv";

/// Student template whose sample rows point at `sample_class`.
pub fn student_import_template(sample_class: &str) -> String {
    let mut out = String::from("Name,Email,Class Name,Enrollment Date\n");
    for (name, email) in [
        ("John Doe", "john.doe@example.com"),
        ("Jane Smith", "jane.smith@example.com"),
        ("Mike Johnson", "mike.johnson@example.com"),
    ] {
        out.push_str(&format!("{name},{email},{},2024-01-15\n", csv_field(sample_class)));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// One data row keyed by lowercased header.
struct Row(HashMap<String, String>);

impl Row {
    fn get(&self, keys: &[&str]) -> &str {
        keys.iter()
            .find_map(|k| self.0.get(*k).filter(|v| !v.is_empty()))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Parses `text` into rows, dropping rows with fewer than `min_fields` values.
fn parse_rows(text: &str, min_fields: usize) -> Result<Vec<Row>, AttendanceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("read CSV header")
        .map_err(malformed)?
        .iter()
        .map(str::to_lowercase)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("read CSV record").map_err(malformed)?;
        if record.len() < min_fields {
            continue;
        }
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_owned()))
            .collect();
        rows.push(Row(fields));
    }
    if rows.is_empty() {
        return Err(AttendanceError::ImportRejected(vec![
            "No data found in CSV file".to_owned(),
        ]));
    }
    Ok(rows)
}

fn malformed(e: anyhow::Error) -> AttendanceError {
    AttendanceError::ImportRejected(vec![format!("Malformed CSV: {e:#}")])
}

fn line(index: usize) -> usize {
    index + 2
}

// ── ImportClasses ────────────────────────────────────────────────────────────

pub struct ImportClassesUseCase<'a, S: Storage> {
    pub api: &'a DataApi<S>,
}

impl<S: Storage> ImportClassesUseCase<'_, S> {
    /// Validates every row first; any error rejects the whole file.
    pub async fn execute(&self, text: &str) -> Result<ImportSummary, AttendanceError> {
        let rows = parse_rows(text, 2)?;
        let existing: HashSet<String> = self
            .api
            .get_classes()
            .await
            .into_iter()
            .map(|c| c.name.to_lowercase())
            .collect();

        let errors = class_errors(&rows, existing.clone());
        if !errors.is_empty() {
            return Err(AttendanceError::ImportRejected(errors));
        }

        let mut names = existing;
        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
        };
        for row in &rows {
            let input = NewClass {
                name: row.get(&["name"]).to_owned(),
                subject: row.get(&["subject"]).to_owned(),
                schedule: row.get(&["schedule"]).to_owned(),
            };
            let key = input.name.to_lowercase();
            if names.contains(&key) || validate_class_data(&input).is_err() {
                summary.skipped += 1;
                continue;
            }
            self.api.add_class(&input).await?;
            names.insert(key);
            summary.imported += 1;
        }
        Ok(summary)
    }
}

fn class_errors(rows: &[Row], mut names: HashSet<String>) -> Vec<String> {
    let mut errors = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let n = line(i);
        let name = row.get(&["name"]);
        if name.is_empty() {
            errors.push(format!("Line {n}: Class name is required"));
        } else if !names.insert(name.to_lowercase()) {
            errors.push(format!("Line {n}: Class \"{name}\" already exists"));
        }
        if row.get(&["subject"]).is_empty() {
            errors.push(format!("Line {n}: Subject is required"));
        }
        if row.get(&["schedule"]).is_empty() {
            errors.push(format!("Line {n}: Schedule is required"));
        }
    }
    errors
}

// ── ImportStudents ───────────────────────────────────────────────────────────

const CLASS_NAME_KEYS: &[&str] = &["class name", "classname"];
const ENROLLMENT_DATE_KEYS: &[&str] = &["enrollment date", "enrollmentdate"];

pub struct ImportStudentsUseCase<'a, S: Storage> {
    pub api: &'a DataApi<S>,
}

impl<S: Storage> ImportStudentsUseCase<'_, S> {
    /// Rows resolve their class by case-insensitive name. Emails already on
    /// file, or repeated earlier in the same file, are skipped.
    pub async fn execute(&self, text: &str) -> Result<ImportSummary, AttendanceError> {
        let rows = parse_rows(text, 3)?;
        let classes: HashMap<String, String> = self
            .api
            .get_classes()
            .await
            .into_iter()
            .map(|c| (c.name.to_lowercase(), c.id))
            .collect();
        let mut emails: HashSet<String> = self
            .api
            .get_students()
            .await
            .into_iter()
            .map(|s| s.email.to_lowercase())
            .collect();

        let errors = student_errors(&rows, &classes, &emails);
        if !errors.is_empty() {
            return Err(AttendanceError::ImportRejected(errors));
        }

        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
        };
        for row in &rows {
            let Some(class_id) = classes.get(&row.get(CLASS_NAME_KEYS).to_lowercase()) else {
                summary.skipped += 1;
                continue;
            };
            let input = NewStudent {
                name: row.get(&["name"]).to_owned(),
                email: row.get(&["email"]).to_owned(),
                class_id: class_id.clone(),
                enrollment_date: row.get(ENROLLMENT_DATE_KEYS).parse().ok(),
            };
            let key = input.email.to_lowercase();
            if emails.contains(&key) || validate_student_data(&input).is_err() {
                summary.skipped += 1;
                continue;
            }
            self.api.add_student(&input).await?;
            emails.insert(key);
            summary.imported += 1;
        }
        Ok(summary)
    }
}

fn student_errors(
    rows: &[Row],
    classes: &HashMap<String, String>,
    emails: &HashSet<String>,
) -> Vec<String> {
    let mut errors = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let n = line(i);
        if row.get(&["name"]).is_empty() {
            errors.push(format!("Line {n}: Name is required"));
        }

        let email = row.get(&["email"]);
        if email.is_empty() {
            errors.push(format!("Line {n}: Email is required"));
        } else {
            if !validate_email(email) {
                errors.push(format!("Line {n}: Invalid email format ({email})"));
            }
            if emails.contains(&email.to_lowercase()) {
                errors.push(format!("Line {n}: Email already exists ({email})"));
            }
        }

        let class_name = row.get(CLASS_NAME_KEYS);
        if class_name.is_empty() {
            errors.push(format!("Line {n}: Class name is required"));
        } else if !classes.contains_key(&class_name.to_lowercase()) {
            errors.push(format!("Line {n}: Class \"{class_name}\" does not exist"));
        }

        let date = row.get(ENROLLMENT_DATE_KEYS);
        if date.is_empty() {
            errors.push(format!("Line {n}: Enrollment date is required"));
        } else if !is_iso_date(date) || date.parse::<NaiveDate>().is_err() {
            errors.push(format!(
                "Line {n}: Invalid date format. Use YYYY-MM-DD ({date})"
            ));
        }
    }
    errors
}
