#![allow(async_fn_in_trait)]

use crate::domain::types::{
    AttendanceMark, AttendanceRange, AttendanceRecord, Class, ClassPatch, NewClass, NewStudent,
    NewUser, Student, StudentPatch, User, UserPatch,
};
use crate::error::AttendanceError;

// Every storage backend implements all four repositories. By-id lookups return
// `Ok(None)` for a missing row; only genuine backend failures are errors.

/// Repository for administrator and teacher accounts.
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, AttendanceError>;
    async fn find_user(&self, id: &str) -> Result<Option<User>, AttendanceError>;
    async fn find_user_by_username(&self, username: &str)
    -> Result<Option<User>, AttendanceError>;
    /// Stores a new account. Username uniqueness is checked by the caller.
    async fn create_user(&self, input: &NewUser) -> Result<User, AttendanceError>;
    /// Returns `None` when no account has `id`.
    async fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> Result<Option<User>, AttendanceError>;
    async fn delete_user(&self, id: &str) -> Result<(), AttendanceError>;
}

/// Repository for classes.
pub trait ClassRepository: Send + Sync {
    async fn list_classes(&self) -> Result<Vec<Class>, AttendanceError>;
    async fn list_classes_by_ids(&self, ids: &[String]) -> Result<Vec<Class>, AttendanceError>;
    async fn find_class(&self, id: &str) -> Result<Option<Class>, AttendanceError>;
    async fn create_class(&self, input: &NewClass) -> Result<Class, AttendanceError>;
    async fn update_class(
        &self,
        id: &str,
        patch: &ClassPatch,
    ) -> Result<Option<Class>, AttendanceError>;
    /// Removes the class, then its students, then every attendance record of
    /// the class or of those students.
    async fn delete_class(&self, id: &str) -> Result<(), AttendanceError>;
}

/// Repository for students.
pub trait StudentRepository: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, AttendanceError>;
    async fn list_students_by_class(
        &self,
        class_id: &str,
    ) -> Result<Vec<Student>, AttendanceError>;
    async fn find_student(&self, id: &str) -> Result<Option<Student>, AttendanceError>;
    async fn create_student(&self, input: &NewStudent) -> Result<Student, AttendanceError>;
    async fn update_student(
        &self,
        id: &str,
        patch: &StudentPatch,
    ) -> Result<Option<Student>, AttendanceError>;
    /// Removes the student and all of their attendance records.
    async fn delete_student(&self, id: &str) -> Result<(), AttendanceError>;
}

/// Repository for attendance records.
pub trait AttendanceRepository: Send + Sync {
    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, AttendanceError>;
    async fn list_attendance_by_date_and_class(
        &self,
        date: chrono::NaiveDate,
        class_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError>;
    async fn list_attendance_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError>;
    async fn list_attendance_in_range(
        &self,
        range: &AttendanceRange,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError>;
    /// Insert-or-update keyed by `(student_id, class_id, date)`. Returns the
    /// stored record.
    async fn upsert_attendance(
        &self,
        mark: &AttendanceMark,
    ) -> Result<AttendanceRecord, AttendanceError>;
}

/// A complete storage backend.
pub trait Storage: UserRepository + ClassRepository + StudentRepository + AttendanceRepository {
    /// Whether requests are served by the remote relational backend.
    fn is_remote(&self) -> bool;
}
