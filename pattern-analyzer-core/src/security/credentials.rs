//! Secure credential container with automatic memory zeroing.
//!
//! # Security
//! - The password is stored in a `Zeroizing` container and cleared on drop
//! - The password is skipped by serde, so presets never persist it
//! - `Debug` renders the password as `****`

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Database login that zeros its memory on drop.
///
/// # Example
///
/// ```rust
/// use pattern_analyzer_core::security::Credentials;
///
/// let creds = Credentials::new("admin".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "admin");
/// assert!(creds.has_password());
/// assert!(!format!("{creds:?}").contains("secret"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// Login name
    #[serde(default)]
    pub username: String,
    #[serde(skip)]
    password: Option<Zeroizing<String>>,
}

impl Credentials {
    /// Creates new credentials; the password is moved into secure storage.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username,
            password: password.map(Zeroizing::new),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks if password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Exposes the password to a driver.
    ///
    /// Callers must not log or persist the returned value.
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.as_str())
    }

    /// Replaces the password, zeroing the previous one.
    pub fn set_password(&mut self, password: Option<String>) {
        self.password = password.map(Zeroizing::new);
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}
