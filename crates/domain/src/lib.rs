//! Domain layer for Waymark
//!
//! Contains the geographic value objects exchanged between the geocoding
//! client, the routing client and the waypoint file format.
//! This layer performs no I/O.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::*;
