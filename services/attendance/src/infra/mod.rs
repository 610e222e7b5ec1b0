pub mod backend;
pub mod id;
pub mod kv;
pub mod local;
pub mod remote;
