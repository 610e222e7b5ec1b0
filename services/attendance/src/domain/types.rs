use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Account role. Only teachers carry meaningful class assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
        }
    }
}

/// Daily attendance mark for one student in one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::Absent => "absent",
        }
    }

    /// Capitalised form used in reports and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Late => "Late",
            Self::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            other => Err(ParseEnumError {
                kind: "role",
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "late" => Ok(Self::Late),
            "absent" => Ok(Self::Absent),
            other => Err(ParseEnumError {
                kind: "attendance status",
                value: other.to_owned(),
            }),
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────
//
// Field names serialize in the canonical camelCase form. The local store keeps
// these JSON shapes verbatim.

/// Administrator or teacher account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Unique, case-sensitive.
    pub username: String,
    /// Opaque credential, stored as given.
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_classes: Vec<String>,
    #[serde(serialize_with = "rollcall_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(serialize_with = "rollcall_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    /// May dangle if the class was removed outside a cascade.
    pub class_id: String,
    pub enrollment_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Whether this record occupies the `(student, class, date)` slot of `mark`.
    pub fn matches(&self, mark: &AttendanceMark) -> bool {
        self.student_id == mark.student_id && self.class_id == mark.class_id && self.date == mark.date
    }
}

// ── Write inputs ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub assigned_classes: Vec<String>,
}

/// Partial user update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub assigned_classes: Option<Vec<String>>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(classes) = &self.assigned_classes {
            user.assigned_classes = classes.clone();
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub schedule: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatch {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub schedule: Option<String>,
}

impl ClassPatch {
    pub fn apply(&self, class: &mut Class) {
        if let Some(name) = &self.name {
            class.name = name.clone();
        }
        if let Some(subject) = &self.subject {
            class.subject = subject.clone();
        }
        if let Some(schedule) = &self.schedule {
            class.schedule = schedule.clone();
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub class_id: String,
    /// Defaults to today (UTC) when absent.
    pub enrollment_date: Option<NaiveDate>,
}

impl NewStudent {
    pub fn enrollment_date_or_today(&self) -> NaiveDate {
        self.enrollment_date
            .unwrap_or_else(rollcall_core::clock::today)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub class_id: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
}

impl StudentPatch {
    pub fn apply(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(email) = &self.email {
            student.email = email.clone();
        }
        if let Some(class_id) = &self.class_id {
            student.class_id = class_id.clone();
        }
        if let Some(date) = self.enrollment_date {
            student.enrollment_date = date;
        }
    }
}

/// Input of an attendance upsert, keyed by `(student_id, class_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Inclusive date range with optional class and student filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub class_id: Option<String>,
    pub student_id: Option<String>,
}

impl AttendanceRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            class_id: None,
            student_id: None,
        }
    }

    pub fn contains(&self, record: &AttendanceRecord) -> bool {
        record.date >= self.start
            && record.date <= self.end
            && self
                .class_id
                .as_ref()
                .is_none_or(|class_id| &record.class_id == class_id)
            && self
                .student_id
                .as_ref()
                .is_none_or(|student_id| &record.student_id == student_id)
    }
}
