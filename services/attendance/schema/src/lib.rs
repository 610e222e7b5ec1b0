//! sea-orm entities for the remote attendance tables.
//!
//! Column names follow the remote snake_case convention (`class_id`,
//! `password_hash`, ...). Translation to application field names happens in the
//! service's remote adapter, never here.

pub mod attendance_records;
pub mod classes;
pub mod students;
pub mod users;
