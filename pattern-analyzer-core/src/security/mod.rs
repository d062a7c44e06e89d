//! Security utilities for credential protection.
//!
//! # Security Guarantees
//! - Passwords are stored in `Zeroizing` containers for automatic memory clearing
//! - Connection URLs are parsed so the password never travels as a plain `String`
//! - Passwords are never serialized and never appear in `Debug` output
//!
//! # Module Structure
//! - `credentials`: Secure credential container with automatic memory zeroing
//! - `connection`: Connection URL parsing into a `ConnectionDescriptor`

mod connection;
mod credentials;

pub use connection::parse_connection_url;
pub use credentials::Credentials;
