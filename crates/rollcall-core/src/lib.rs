//! Plumbing shared by Rollcall services: tracing setup, health probes and
//! timestamp helpers. Nothing in here knows about attendance data.

pub mod clock;
pub mod health;
pub mod serde;
pub mod tracing;
