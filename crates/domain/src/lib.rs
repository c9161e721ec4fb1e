//! festival-notifier domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Application use cases / business logic
//! - `policy`: Festival classification and the major-festival filter

pub mod model;
pub mod policy;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;
