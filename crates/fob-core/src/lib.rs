//! FOB Contest Core — shared domain abstractions.
//!
//! This crate defines the traits and types the contest context and its
//! adapters depend on. It contains no infrastructure code.

pub mod aggregate;
pub mod backup;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
