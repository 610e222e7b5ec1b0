use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::{AttendanceConfig, RemoteSettings};
use crate::domain::repository::{
    AttendanceRepository, ClassRepository, Storage, StudentRepository, UserRepository,
};
use crate::domain::types::{
    AttendanceMark, AttendanceRange, AttendanceRecord, Class, ClassPatch, NewClass, NewStudent,
    NewUser, Student, StudentPatch, User, UserPatch,
};
use crate::error::AttendanceError;
use crate::infra::kv::{FileKv, KeyValueStore};
use crate::infra::local::LocalStore;
use crate::infra::remote::RemoteStore;

/// The backend chosen at startup. Fixed for the lifetime of the process.
#[derive(Clone)]
pub enum Backend {
    Local(LocalStore),
    Remote(RemoteStore),
}

impl Backend {
    /// Picks the remote backend when it is configured and reachable, otherwise
    /// the local one (seeded on first use).
    ///
    /// The remote endpoint is tried exactly once. Any failure falls back to
    /// local storage; selection itself never fails because of the remote side.
    pub async fn select(
        remote: Option<RemoteSettings>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AttendanceError> {
        if let Some(settings) = remote {
            match RemoteStore::connect(&settings).await {
                Ok(store) => {
                    info!(backend = "remote", "storage backend selected");
                    return Ok(Self::Remote(store));
                }
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "remote store unavailable, falling back to local storage");
                }
            }
        } else {
            info!("remote store not configured");
        }

        let local = LocalStore::new(kv);
        local.seed()?;
        info!(backend = "local", "storage backend selected");
        Ok(Self::Local(local))
    }

    pub async fn from_config(config: &AttendanceConfig) -> Result<Self, AttendanceError> {
        let kv = FileKv::open(&config.data_dir)?;
        Self::select(config.remote(), Arc::new(kv)).await
    }
}

macro_rules! dispatch {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match $self {
            Backend::Local(store) => store.$method($($arg),*).await,
            Backend::Remote(store) => store.$method($($arg),*).await,
        }
    };
}

impl UserRepository for Backend {
    async fn list_users(&self) -> Result<Vec<User>, AttendanceError> {
        dispatch!(self.list_users())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AttendanceError> {
        dispatch!(self.find_user(id))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, AttendanceError> {
        dispatch!(self.find_user_by_username(username))
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, AttendanceError> {
        dispatch!(self.create_user(input))
    }

    async fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> Result<Option<User>, AttendanceError> {
        dispatch!(self.update_user(id, patch))
    }

    async fn delete_user(&self, id: &str) -> Result<(), AttendanceError> {
        dispatch!(self.delete_user(id))
    }
}

impl ClassRepository for Backend {
    async fn list_classes(&self) -> Result<Vec<Class>, AttendanceError> {
        dispatch!(self.list_classes())
    }

    async fn list_classes_by_ids(&self, ids: &[String]) -> Result<Vec<Class>, AttendanceError> {
        dispatch!(self.list_classes_by_ids(ids))
    }

    async fn find_class(&self, id: &str) -> Result<Option<Class>, AttendanceError> {
        dispatch!(self.find_class(id))
    }

    async fn create_class(&self, input: &NewClass) -> Result<Class, AttendanceError> {
        dispatch!(self.create_class(input))
    }

    async fn update_class(
        &self,
        id: &str,
        patch: &ClassPatch,
    ) -> Result<Option<Class>, AttendanceError> {
        dispatch!(self.update_class(id, patch))
    }

    async fn delete_class(&self, id: &str) -> Result<(), AttendanceError> {
        dispatch!(self.delete_class(id))
    }
}

impl StudentRepository for Backend {
    async fn list_students(&self) -> Result<Vec<Student>, AttendanceError> {
        dispatch!(self.list_students())
    }

    async fn list_students_by_class(
        &self,
        class_id: &str,
    ) -> Result<Vec<Student>, AttendanceError> {
        dispatch!(self.list_students_by_class(class_id))
    }

    async fn find_student(&self, id: &str) -> Result<Option<Student>, AttendanceError> {
        dispatch!(self.find_student(id))
    }

    async fn create_student(&self, input: &NewStudent) -> Result<Student, AttendanceError> {
        dispatch!(self.create_student(input))
    }

    async fn update_student(
        &self,
        id: &str,
        patch: &StudentPatch,
    ) -> Result<Option<Student>, AttendanceError> {
        dispatch!(self.update_student(id, patch))
    }

    async fn delete_student(&self, id: &str) -> Result<(), AttendanceError> {
        dispatch!(self.delete_student(id))
    }
}

impl AttendanceRepository for Backend {
    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        dispatch!(self.list_attendance())
    }

    async fn list_attendance_by_date_and_class(
        &self,
        date: NaiveDate,
        class_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        dispatch!(self.list_attendance_by_date_and_class(date, class_id))
    }

    async fn list_attendance_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        dispatch!(self.list_attendance_by_student(student_id))
    }

    async fn list_attendance_in_range(
        &self,
        range: &AttendanceRange,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        dispatch!(self.list_attendance_in_range(range))
    }

    async fn upsert_attendance(
        &self,
        mark: &AttendanceMark,
    ) -> Result<AttendanceRecord, AttendanceError> {
        dispatch!(self.upsert_attendance(mark))
    }
}

impl Storage for Backend {
    fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
