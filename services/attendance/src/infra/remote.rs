use std::time::Duration;

use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectOptions, Database, DatabaseConnection,
    EntityTrait, IntoActiveModel as _, QueryFilter, QueryOrder, sea_query::OnConflict,
};
use uuid::Uuid;

use rollcall_attendance_schema::{attendance_records, classes, students, users};
use rollcall_core::clock::now_millis;

use crate::config::RemoteSettings;
use crate::domain::repository::{
    AttendanceRepository, ClassRepository, Storage, StudentRepository, UserRepository,
};
use crate::domain::types::{
    AttendanceMark, AttendanceRange, AttendanceRecord, Class, ClassPatch, NewClass, NewStudent,
    NewUser, Student, StudentPatch, User, UserPatch,
};
use crate::error::AttendanceError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage backend over the remote relational tables.
///
/// Cascading deletes are left to the database's foreign keys.
#[derive(Clone)]
pub struct RemoteStore {
    pub db: DatabaseConnection,
}

impl RemoteStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a connection and verifies it with a round trip.
    ///
    /// Only this probe is bounded by `CONNECT_TIMEOUT`; queries issued later
    /// through the pool carry no deadline of their own.
    pub async fn connect(settings: &RemoteSettings) -> anyhow::Result<Self> {
        let mut options = ConnectOptions::new(settings.connection_url());
        options.sqlx_logging(false);
        let probe = async {
            let db = Database::connect(options)
                .await
                .context("connect to remote store")?;
            db.ping().await.context("ping remote store")?;
            anyhow::Ok(db)
        };
        let db = tokio::time::timeout(CONNECT_TIMEOUT, probe)
            .await
            .context("remote store probe timed out")??;
        Ok(Self { db })
    }
}

fn new_row_id() -> String {
    Uuid::new_v4().to_string()
}

// ── Users ────────────────────────────────────────────────────────────────────

impl UserRepository for RemoteStore {
    async fn list_users(&self) -> Result<Vec<User>, AttendanceError> {
        let models = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models
            .into_iter()
            .map(user_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AttendanceError> {
        let model = users::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, AttendanceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, AttendanceError> {
        let user = User {
            id: new_row_id(),
            username: input.username.clone(),
            password: input.password.clone(),
            role: input.role,
            assigned_classes: input.assigned_classes.clone(),
            created_at: now_millis(),
        };
        users::ActiveModel {
            id: Set(user.id.clone()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password.clone()),
            role: Set(user.role.as_str().to_owned()),
            assigned_classes: Set(serde_json::json!(user.assigned_classes)),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(user)
    }

    async fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> Result<Option<User>, AttendanceError> {
        let Some(model) = users::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .context("find user for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        if let Some(username) = &patch.username {
            am.username = Set(username.clone());
        }
        if let Some(password) = &patch.password {
            am.password_hash = Set(password.clone());
        }
        if let Some(role) = patch.role {
            am.role = Set(role.as_str().to_owned());
        }
        if let Some(classes) = &patch.assigned_classes {
            am.assigned_classes = Set(serde_json::json!(classes));
        }
        let updated = am.update(&self.db).await.context("update user")?;
        Ok(Some(user_from_model(updated)?))
    }

    async fn delete_user(&self, id: &str) -> Result<(), AttendanceError> {
        users::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> anyhow::Result<User> {
    Ok(User {
        role: model
            .role
            .parse()
            .with_context(|| format!("user {}", model.id))?,
        assigned_classes: serde_json::from_value(model.assigned_classes)
            .with_context(|| format!("assigned_classes of user {}", model.id))?,
        id: model.id,
        username: model.username,
        password: model.password_hash,
        created_at: model.created_at,
    })
}

// ── Classes ──────────────────────────────────────────────────────────────────

impl ClassRepository for RemoteStore {
    async fn list_classes(&self) -> Result<Vec<Class>, AttendanceError> {
        let models = classes::Entity::find()
            .order_by_desc(classes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list classes")?;
        Ok(models.into_iter().map(class_from_model).collect())
    }

    async fn list_classes_by_ids(&self, ids: &[String]) -> Result<Vec<Class>, AttendanceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = classes::Entity::find()
            .filter(classes::Column::Id.is_in(ids.iter().cloned()))
            .order_by_desc(classes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list classes by ids")?;
        Ok(models.into_iter().map(class_from_model).collect())
    }

    async fn find_class(&self, id: &str) -> Result<Option<Class>, AttendanceError> {
        let model = classes::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .context("find class by id")?;
        Ok(model.map(class_from_model))
    }

    async fn create_class(&self, input: &NewClass) -> Result<Class, AttendanceError> {
        let model = classes::ActiveModel {
            id: Set(new_row_id()),
            name: Set(input.name.clone()),
            subject: Set(input.subject.clone()),
            schedule: Set(input.schedule.clone()),
            created_at: Set(now_millis()),
        }
        .insert(&self.db)
        .await
        .context("create class")?;
        Ok(class_from_model(model))
    }

    async fn update_class(
        &self,
        id: &str,
        patch: &ClassPatch,
    ) -> Result<Option<Class>, AttendanceError> {
        let Some(model) = classes::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .context("find class for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(subject) = &patch.subject {
            am.subject = Set(subject.clone());
        }
        if let Some(schedule) = &patch.schedule {
            am.schedule = Set(schedule.clone());
        }
        let updated = am.update(&self.db).await.context("update class")?;
        Ok(Some(class_from_model(updated)))
    }

    async fn delete_class(&self, id: &str) -> Result<(), AttendanceError> {
        // students and attendance_records go with it (ON DELETE CASCADE)
        classes::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .context("delete class")?;
        Ok(())
    }
}

fn class_from_model(model: classes::Model) -> Class {
    Class {
        id: model.id,
        name: model.name,
        subject: model.subject,
        schedule: model.schedule,
        created_at: model.created_at,
    }
}

// ── Students ─────────────────────────────────────────────────────────────────

impl StudentRepository for RemoteStore {
    async fn list_students(&self) -> Result<Vec<Student>, AttendanceError> {
        let models = students::Entity::find()
            .order_by_desc(students::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list students")?;
        Ok(models.into_iter().map(student_from_model).collect())
    }

    async fn list_students_by_class(
        &self,
        class_id: &str,
    ) -> Result<Vec<Student>, AttendanceError> {
        let models = students::Entity::find()
            .filter(students::Column::ClassId.eq(class_id))
            .order_by_desc(students::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list students by class")?;
        Ok(models.into_iter().map(student_from_model).collect())
    }

    async fn find_student(&self, id: &str) -> Result<Option<Student>, AttendanceError> {
        let model = students::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .context("find student by id")?;
        Ok(model.map(student_from_model))
    }

    async fn create_student(&self, input: &NewStudent) -> Result<Student, AttendanceError> {
        let model = students::ActiveModel {
            id: Set(new_row_id()),
            name: Set(input.name.clone()),
            email: Set(input.email.clone()),
            class_id: Set(input.class_id.clone()),
            enrollment_date: Set(input.enrollment_date_or_today()),
            created_at: Set(now_millis()),
        }
        .insert(&self.db)
        .await
        .context("create student")?;
        Ok(student_from_model(model))
    }

    async fn update_student(
        &self,
        id: &str,
        patch: &StudentPatch,
    ) -> Result<Option<Student>, AttendanceError> {
        let Some(model) = students::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .context("find student for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(email) = &patch.email {
            am.email = Set(email.clone());
        }
        if let Some(class_id) = &patch.class_id {
            am.class_id = Set(class_id.clone());
        }
        if let Some(date) = patch.enrollment_date {
            am.enrollment_date = Set(date);
        }
        let updated = am.update(&self.db).await.context("update student")?;
        Ok(Some(student_from_model(updated)))
    }

    async fn delete_student(&self, id: &str) -> Result<(), AttendanceError> {
        students::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .context("delete student")?;
        Ok(())
    }
}

fn student_from_model(model: students::Model) -> Student {
    Student {
        id: model.id,
        name: model.name,
        email: model.email,
        class_id: model.class_id,
        enrollment_date: model.enrollment_date,
    }
}

// ── Attendance ───────────────────────────────────────────────────────────────

impl AttendanceRepository for RemoteStore {
    async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let models = attendance_records::Entity::find()
            .order_by_desc(attendance_records::Column::Date)
            .all(&self.db)
            .await
            .context("list attendance")?;
        Ok(records_from_models(models)?)
    }

    async fn list_attendance_by_date_and_class(
        &self,
        date: chrono::NaiveDate,
        class_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let models = attendance_records::Entity::find()
            .filter(attendance_records::Column::Date.eq(date))
            .filter(attendance_records::Column::ClassId.eq(class_id))
            .all(&self.db)
            .await
            .context("list attendance by date and class")?;
        Ok(records_from_models(models)?)
    }

    async fn list_attendance_by_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let models = attendance_records::Entity::find()
            .filter(attendance_records::Column::StudentId.eq(student_id))
            .order_by_desc(attendance_records::Column::Date)
            .all(&self.db)
            .await
            .context("list attendance by student")?;
        Ok(records_from_models(models)?)
    }

    async fn list_attendance_in_range(
        &self,
        range: &AttendanceRange,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let mut query = attendance_records::Entity::find()
            .filter(attendance_records::Column::Date.gte(range.start))
            .filter(attendance_records::Column::Date.lte(range.end));
        if let Some(class_id) = &range.class_id {
            query = query.filter(attendance_records::Column::ClassId.eq(class_id.as_str()));
        }
        if let Some(student_id) = &range.student_id {
            query = query.filter(attendance_records::Column::StudentId.eq(student_id.as_str()));
        }
        let models = query
            .order_by_desc(attendance_records::Column::Date)
            .all(&self.db)
            .await
            .context("list attendance in range")?;
        Ok(records_from_models(models)?)
    }

    async fn upsert_attendance(
        &self,
        mark: &AttendanceMark,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let am = attendance_records::ActiveModel {
            id: Set(new_row_id()),
            student_id: Set(mark.student_id.clone()),
            class_id: Set(mark.class_id.clone()),
            date: Set(mark.date),
            status: Set(mark.status.as_str().to_owned()),
            created_at: Set(now_millis()),
        };
        attendance_records::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([
                    attendance_records::Column::StudentId,
                    attendance_records::Column::ClassId,
                    attendance_records::Column::Date,
                ])
                .update_column(attendance_records::Column::Status)
                .to_owned(),
            )
            .exec(&self.db)
            .await
            .context("upsert attendance")?;

        let stored = attendance_records::Entity::find()
            .filter(attendance_records::Column::StudentId.eq(mark.student_id.as_str()))
            .filter(attendance_records::Column::ClassId.eq(mark.class_id.as_str()))
            .filter(attendance_records::Column::Date.eq(mark.date))
            .one(&self.db)
            .await
            .context("read back upserted attendance")?
            .context("upserted attendance row missing")?;
        Ok(record_from_model(stored)?)
    }
}

fn record_from_model(model: attendance_records::Model) -> anyhow::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        status: model
            .status
            .parse()
            .with_context(|| format!("attendance record {}", model.id))?,
        id: model.id,
        student_id: model.student_id,
        class_id: model.class_id,
        date: model.date,
    })
}

fn records_from_models(
    models: Vec<attendance_records::Model>,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    models.into_iter().map(record_from_model).collect()
}

impl Storage for RemoteStore {
    fn is_remote(&self) -> bool {
        true
    }
}
