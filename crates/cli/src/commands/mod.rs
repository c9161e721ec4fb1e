//! Subcommand implementations

pub mod config;
pub mod destination;
pub mod doctor;
pub mod preview;
pub mod run;
