use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context as _;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use rollcall_core::clock::now_millis;

use crate::domain::repository::{
    AttendanceRepository, ClassRepository, Storage, StudentRepository, UserRepository,
};
use crate::domain::types::{
    AttendanceMark, AttendanceRange, AttendanceRecord, Class, ClassPatch, NewClass, NewStudent,
    NewUser, Role, Student, StudentPatch, User, UserPatch,
};
use crate::error::AttendanceError;
use crate::infra::id::generate_id;
use crate::infra::kv::KeyValueStore;

pub const USERS_KEY: &str = "attendance_users";
pub const CLASSES_KEY: &str = "attendance_classes";
pub const STUDENTS_KEY: &str = "attendance_students";
pub const RECORDS_KEY: &str = "attendance_records";

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Storage backend over four JSON collections in a key/value store.
///
/// Every read deserializes a whole collection and every write serializes it
/// back. Read-modify-write sequences are not atomic: two writers that interleave
/// on the same collection can lose an update.
#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Create the default admin account and the empty collections, skipping any
    /// collection that already exists. Safe to call on every startup.
    pub fn seed(&self) -> Result<(), AttendanceError> {
        if self.kv.get(USERS_KEY)?.is_none() {
            let admin = User {
                id: generate_id(),
                username: DEFAULT_ADMIN_USERNAME.to_owned(),
                password: DEFAULT_ADMIN_PASSWORD.to_owned(),
                role: Role::Admin,
                assigned_classes: Vec::new(),
                created_at: now_millis(),
            };
            self.write(USERS_KEY, &[admin])?;
            info!(username = DEFAULT_ADMIN_USERNAME, "seeded default admin account");
        }
        for key in [CLASSES_KEY, STUDENTS_KEY, RECORDS_KEY] {
            if self.kv.get(key)?.is_none() {
                self.kv.set(key, "[]")?;
            }
        }
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AttendanceError> {
        match self.kv.get(key)? {
            Some(raw) => {
                let items = serde_json::from_str(&raw).with_context(|| format!("parse {key}"))?;
                Ok(items)
            }
            None => Ok(Vec::new()),
        }
    }

    fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), AttendanceError> {
        let raw = serde_json::to_string(items).with_context(|| format!("serialize {key}"))?;
        self.kv.set(key, &raw)?;
        Ok(())
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

impl UserRepository for LocalStore {
    async fn list_users(&self) -> Result<Vec<User>, AttendanceError> {
        self.read(USERS_KEY)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AttendanceError> {
        let users: Vec<User> = self.read(USERS_KEY)?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, AttendanceError> {
        let users: Vec<User> = self.read(USERS_KEY)?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, AttendanceError> {
        let mut users: Vec<User> = self.read(USERS_KEY)?;
        let user = User {
            id: generate_id(),
            username: input.username.clone(),
            password: input.password.clone(),
            role: input.role,
            assigned_classes: input.assigned_classes.clone(),
            created_at: now_millis(),
        };
        users.push(user.clone());
        self.write(USERS_KEY, &users)?;
        Ok(user)
    }

    async fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> Result<Option<User>, AttendanceError> {
        let mut users: Vec<User> = self.read(USERS_KEY)?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        patch.apply(user);
        let updated = user.clone();
        self.write(USERS_KEY, &users)?;
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: &str) -> Result<(), AttendanceError> {
        let mut users: Vec<User> = self.read(USERS_KEY)?;
        users.retain(|u| u.id != id);
        self.write(USERS_KEY, &users)
    }
}

// ── Classes ──────────────────────────────────────────────────────────────────

impl ClassRepository for LocalStore {
    async fn list_classes(&self) -> Result<Vec<Class>, AttendanceError> {
        self.read(CLASSES_KEY)
    }

    async fn list_classes_by_ids(&self, ids: &[String]) -> Result<Vec<Class>, AttendanceError> {
        let classes: Vec<Class> = self.read(CLASSES_KEY)?;
        Ok(classes.into_iter().filter(|c| ids.contains(&c.id)).collect())
    }

    async fn find_class(&self, id: &str) -> Result<Option<Class>, AttendanceError> {
        let classes: Vec<Class> = self.read(CLASSES_KEY)?;
        Ok(classes.into_iter().find(|c| c.id == id))
    }

    async fn create_class(&self, input: &NewClass) -> Result<Class, AttendanceError> {
        let mut classes: Vec<Class> = self.read(CLASSES_KEY)?;
        let class = Class {
            id: generate_id(),
            name: input.name.clone(),
            subject: input.subject.clone(),
            schedule: input.schedule.clone(),
            created_at: now_millis(),
        };
        classes.push(class.clone());
        self.write(CLASSES_KEY, &classes)?;
        Ok(class)
    }

    async fn update_class(
        &self,
        id: &str,
        patch: &ClassPatch,
    ) -> Result<Option<Class>, AttendanceError> {
        let mut classes: Vec<Class> = self.read(CLASSES_KEY)?;
        let Some(class) = classes.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        patch.apply(class);
        let updated = class.clone();
        self.write(CLASSES_KEY, &classes)?;
        Ok(Some(updated))
    }

    async fn delete_class(&self, id: &str) -> Result<(), AttendanceError> {
        let mut classes: Vec<Class> = self.read(CLASSES_KEY)?;
        classes.retain(|c| c.id != id);
        self.write(CLASSES_KEY, &classes)?;

        let mut students: Vec<Student> = self.read(STUDENTS_KEY)?;
        let removed: HashSet<String> = students
            .iter()
            .filter(|s| s.class_id == id)
            .map(|s| s.id.clone())
            .collect();
        students.retain(|s| !removed.contains(&s.id));
        self.write(STUDENTS_KEY, &students)?;

        let mut records: Vec<AttendanceRecord> = self.read(RECORDS_KEY)?;
        records.retain(|r| r.class_id != id && !removed.contains(&r.student_id));
        self.write(RECORDS_KEY, &records)
    }
}

// ── Students ─────────────────────────────────────────────────────────────────

impl StudentRepository for LocalStore {
    async fn list_students(&self) -> Result<Vec<Student>, AttendanceError> {
        self.read(STUDENTS_KEY)
    }

    async fn list_students_by_class(
        &self,
        class_id: &str,
    ) -> Result<Vec<Student>, AttendanceError> {
        let students: Vec<Student> = self.read(STUDENTS_KEY)?;
        Ok(students
            .into_iter()
            .filter(|s| s.class_id == class_id)
            .collect())
    }

    async fn find_student(&self, id: &str) -> Result<Option<Student>, AttendanceError> {
        let students: Vec<Student> = self.read(STUDENTS_KEY)?;
        Ok(students.into_iter().find(|s| s.id == id))
    }

    async fn create_student(&self, input: &NewStudent) -> Result<Student, AttendanceError> {
        let mut students: Vec<Student> = self.read(STUDENTS_KEY)?;
        let student = Student {
            id: generate_id(),
            name: input.name.clone(),
            email: input.email.clone(),
            class_id: input.class_id.clone(),
            enrollment_date: input.enrollment_date_or_today(),
        };
        students.push(student.clone());
        self.write(STUDENTS_KEY, &students)?;
        Ok(student)
    }

    async fn update_student(
        &self,
        id: &str,
        patch: &StudentPatch,
    ) -> Result<Option<Student>, AttendanceError> {
        let mut students: Vec<Student> = self.read(STUDENTS_KEY)?;
        let Some(student) = students.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        patch.apply(student);
        let updated = student.clone();
        self.write(STUDENTS_KEY, &students)?;
        Ok(Some(updated))
    }

    async fn delete_student(&self, id: &str) -> Result<(), AttendanceError> {
        let mut students: Vec<Student> = self.read(STUDENTS_KEY)?;
        students.retain(|s| s.id != id);
        self.write(STUDENTS_KEY, &students)?;

        let mut records: Vec<AttendanceRecord> = self.read(RECORDS_KEY)?;
        records.retain(|r| r.student_id != id);
        self.write(RECORDS_KEY, &records)
    }
}

// ── Attendance ───────────────────────────────────────────────────────────────

impl AttendanceRepository for LocalStore {
    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        self.read(RECORDS_KEY)
    }

    async fn list_attendance_by_date_and_class(
        &self,
        date: chrono::NaiveDate,
        class_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let records: Vec<AttendanceRecord> = self.read(RECORDS_KEY)?;
        Ok(records
            .into_iter()
            .filter(|r| r.date == date && r.class_id == class_id)
            .collect())
    }

    async fn list_attendance_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let records: Vec<AttendanceRecord> = self.read(RECORDS_KEY)?;
        Ok(records
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect())
    }

    async fn list_attendance_in_range(
        &self,
        range: &AttendanceRange,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let records: Vec<AttendanceRecord> = self.read(RECORDS_KEY)?;
        Ok(records.into_iter().filter(|r| range.contains(r)).collect())
    }

    async fn upsert_attendance(
        &self,
        mark: &AttendanceMark,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let mut records: Vec<AttendanceRecord> = self.read(RECORDS_KEY)?;
        let stored = match records.iter_mut().find(|r| r.matches(mark)) {
            Some(existing) => {
                existing.status = mark.status;
                existing.clone()
            }
            None => {
                let record = AttendanceRecord {
                    id: generate_id(),
                    student_id: mark.student_id.clone(),
                    class_id: mark.class_id.clone(),
                    date: mark.date,
                    status: mark.status,
                };
                records.push(record.clone());
                record
            }
        };
        self.write(RECORDS_KEY, &records)?;
        Ok(stored)
    }
}

impl Storage for LocalStore {
    fn is_remote(&self) -> bool {
        false
    }
}
