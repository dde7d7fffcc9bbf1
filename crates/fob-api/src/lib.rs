//! FOB Contest API — HTTP adapter for the messaging gateway.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
