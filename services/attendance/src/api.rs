//! Unified data API shared by every caller, independent of the chosen backend.
//!
//! Reads never fail: a backend error is logged and surfaces as an empty
//! collection or `None`. Writes return `Result` and propagate every failure.

use chrono::NaiveDate;
use tracing::error;

use crate::domain::repository::Storage;
use crate::domain::types::{
    AttendanceMark, AttendanceRange, AttendanceRecord, Class, ClassPatch, NewClass, NewStudent,
    NewUser, Student, StudentPatch, User, UserPatch,
};
use crate::error::AttendanceError;

#[derive(Clone)]
pub struct DataApi<S: Storage> {
    store: S,
}

fn degrade<T: Default>(operation: &'static str, result: Result<T, AttendanceError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!(operation, error = ?e, "read failed, returning empty result");
            T::default()
        }
    }
}

impl<S: Storage> DataApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ── Users ────────────────────────────────────────────────────────────────

    pub async fn get_users(&self) -> Vec<User> {
        degrade("get_users", self.store.list_users().await)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Option<User> {
        degrade("get_user_by_id", self.store.find_user(id).await)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        degrade(
            "get_user_by_username",
            self.store.find_user_by_username(username).await,
        )
    }

    /// Fails with `UsernameTaken` when the username is in use. The check and
    /// the insert are separate calls, so concurrent adds can still collide.
    pub async fn add_user(&self, input: &NewUser) -> Result<User, AttendanceError> {
        if self
            .store
            .find_user_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AttendanceError::UsernameTaken);
        }
        self.store.create_user(input).await
    }

    pub async fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> Result<Option<User>, AttendanceError> {
        if let Some(username) = &patch.username {
            if let Some(holder) = self.store.find_user_by_username(username).await? {
                if holder.id != id {
                    return Err(AttendanceError::UsernameTaken);
                }
            }
        }
        self.store.update_user(id, patch).await
    }

    /// Admin accounts cannot be deleted. Deleting an unknown id is a no-op.
    pub async fn delete_user(&self, id: &str) -> Result<(), AttendanceError> {
        match self.store.find_user(id).await? {
            Some(user) if user.is_admin() => Err(AttendanceError::AdminAccountProtected),
            Some(_) => self.store.delete_user(id).await,
            None => Ok(()),
        }
    }

    /// Returns `false` when the user does not exist.
    pub async fn assign_class_to_teacher(
        &self,
        user_id: &str,
        class_id: &str,
    ) -> Result<bool, AttendanceError> {
        let Some(user) = self.store.find_user(user_id).await? else {
            return Ok(false);
        };
        if user.assigned_classes.iter().any(|c| c == class_id) {
            return Ok(true);
        }
        let mut assigned = user.assigned_classes;
        assigned.push(class_id.to_owned());
        self.write_assignments(user_id, assigned).await
    }

    /// Returns `false` when the user does not exist.
    pub async fn unassign_class_from_teacher(
        &self,
        user_id: &str,
        class_id: &str,
    ) -> Result<bool, AttendanceError> {
        let Some(user) = self.store.find_user(user_id).await? else {
            return Ok(false);
        };
        let assigned = user
            .assigned_classes
            .into_iter()
            .filter(|c| c != class_id)
            .collect();
        self.write_assignments(user_id, assigned).await
    }

    async fn write_assignments(
        &self,
        user_id: &str,
        assigned_classes: Vec<String>,
    ) -> Result<bool, AttendanceError> {
        let patch = UserPatch {
            assigned_classes: Some(assigned_classes),
            ..Default::default()
        };
        self.store.update_user(user_id, &patch).await?;
        Ok(true)
    }

    /// Classes assigned to a teacher. Empty for unknown users and for admins.
    pub async fn get_classes_for_teacher(&self, user_id: &str) -> Vec<Class> {
        let Some(user) = self.get_user_by_id(user_id).await else {
            return Vec::new();
        };
        if !user.is_teacher() || user.assigned_classes.is_empty() {
            return Vec::new();
        }
        degrade(
            "get_classes_for_teacher",
            self.store.list_classes_by_ids(&user.assigned_classes).await,
        )
    }

    // ── Classes ──────────────────────────────────────────────────────────────

    pub async fn get_classes(&self) -> Vec<Class> {
        degrade("get_classes", self.store.list_classes().await)
    }

    pub async fn get_class_by_id(&self, id: &str) -> Option<Class> {
        degrade("get_class_by_id", self.store.find_class(id).await)
    }

    pub async fn add_class(&self, input: &NewClass) -> Result<Class, AttendanceError> {
        self.store.create_class(input).await
    }

    pub async fn update_class(
        &self,
        id: &str,
        patch: &ClassPatch,
    ) -> Result<Option<Class>, AttendanceError> {
        self.store.update_class(id, patch).await
    }

    /// Also removes the class's students and every related attendance record.
    pub async fn delete_class(&self, id: &str) -> Result<(), AttendanceError> {
        self.store.delete_class(id).await
    }

    // ── Students ─────────────────────────────────────────────────────────────

    pub async fn get_students(&self) -> Vec<Student> {
        degrade("get_students", self.store.list_students().await)
    }

    pub async fn get_student_by_id(&self, id: &str) -> Option<Student> {
        degrade("get_student_by_id", self.store.find_student(id).await)
    }

    pub async fn get_students_by_class(&self, class_id: &str) -> Vec<Student> {
        degrade(
            "get_students_by_class",
            self.store.list_students_by_class(class_id).await,
        )
    }

    pub async fn add_student(&self, input: &NewStudent) -> Result<Student, AttendanceError> {
        self.store.create_student(input).await
    }

    pub async fn update_student(
        &self,
        id: &str,
        patch: &StudentPatch,
    ) -> Result<Option<Student>, AttendanceError> {
        self.store.update_student(id, patch).await
    }

    pub async fn delete_student(&self, id: &str) -> Result<(), AttendanceError> {
        self.store.delete_student(id).await
    }

    // ── Attendance ───────────────────────────────────────────────────────────

    pub async fn get_attendance_records(&self) -> Vec<AttendanceRecord> {
        degrade("get_attendance_records", self.store.list_attendance().await)
    }

    pub async fn upsert_attendance(
        &self,
        mark: &AttendanceMark,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.store.upsert_attendance(mark).await
    }

    pub async fn get_attendance_by_date_and_class(
        &self,
        date: NaiveDate,
        class_id: &str,
    ) -> Vec<AttendanceRecord> {
        degrade(
            "get_attendance_by_date_and_class",
            self.store
                .list_attendance_by_date_and_class(date, class_id)
                .await,
        )
    }

    pub async fn get_attendance_by_student(&self, student_id: &str) -> Vec<AttendanceRecord> {
        degrade(
            "get_attendance_by_student",
            self.store.list_attendance_by_student(student_id).await,
        )
    }

    /// Records dated within `start..=end`, optionally narrowed to one class
    /// and/or one student.
    pub async fn get_attendance_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        class_id: Option<&str>,
        student_id: Option<&str>,
    ) -> Vec<AttendanceRecord> {
        let range = AttendanceRange {
            start,
            end,
            class_id: class_id.map(str::to_owned),
            student_id: student_id.map(str::to_owned),
        };
        degrade(
            "get_attendance_by_date_range",
            self.store.list_attendance_in_range(&range).await,
        )
    }
}
