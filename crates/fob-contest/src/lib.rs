//! FOB Contest — contest lifecycle and entry management.
//!
//! Participants guess which system the next Guristas FOB will spawn in.
//! Admins open and close entry windows, set deadlines and prizes, and declare
//! the outcome. This crate owns the contest state machine, entry validation,
//! deadline scheduling, winner selection and the read models built on top of
//! the event-sourced contest store.

pub mod application;
pub mod domain;
pub mod settings;
