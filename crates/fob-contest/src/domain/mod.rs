//! Domain layer: the contest aggregate and the rules it enforces.

pub mod aggregates;
pub mod commands;
pub mod deadline;
pub mod entries;
pub mod events;
pub mod locations;
pub mod prizes;
pub mod validation;
pub mod winners;
