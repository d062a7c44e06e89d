//! Configuration types for database sessions.
//!
//! - `ConnectionDescriptor`: which database to reach, with credentials
//! - `ConnectionConfig`: session timeouts and read-only mode
//! - `SamplingConfig`: row limits for sampling and catalog listings
//!
//! # Security
//! Only `ConnectionDescriptor` holds credentials, and its password is never
//! serialized or displayed.

mod connection;
mod sampling;

pub use connection::{ConnectionConfig, ConnectionDescriptor};
pub use sampling::SamplingConfig;
