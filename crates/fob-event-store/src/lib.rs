//! PostgreSQL event store for the FOB contest engine.
//!
//! The table layout lives in `migrations/` at the workspace root.

pub mod pg_event_repository;
