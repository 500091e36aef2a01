//! User: an account that authenticates with an API token.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LabHubError, ValidationError, messages};
use crate::id::{HubId, UserId};
use crate::time::Timestamp;

/// Minimum time between two recorded sign-ins from the same address.
pub const SIGN_IN_REFRESH_MINUTES: i64 = 30;

/// An account allowed to use the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub admin: bool,
    pub last_sign_in_ip: Option<String>,
    pub current_sign_in_ip: Option<String>,
    pub last_sign_in_at: Option<Timestamp>,
    pub current_sign_in_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub default_hub_id: Option<HubId>,
}

impl User {
    /// Create a builder for constructing a [`User`].
    #[must_use]
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] when `name` is blank or `email`
    /// does not look like an address.
    pub fn validate(&self) -> Result<(), LabHubError> {
        let mut errors = ValidationError::new();
        if self.name.trim().is_empty() {
            errors.add("name", messages::BLANK);
        }
        if self.email.trim().is_empty() {
            errors.add("email", messages::BLANK);
        } else if !self.email.contains('@') {
            errors.add("email", messages::INVALID);
        }
        errors.into_result()
    }

    /// Whether a request from `ip` at `at` should be recorded as a new sign-in.
    #[must_use]
    pub fn needs_sign_in_refresh(&self, ip: Option<&str>, at: Timestamp) -> bool {
        match self.current_sign_in_at {
            None => true,
            Some(current) => {
                self.current_sign_in_ip.as_deref() != ip
                    || at - current >= chrono::Duration::minutes(SIGN_IN_REFRESH_MINUTES)
            }
        }
    }

    /// Shift the current sign-in into `last_*` and record a new one.
    pub fn record_sign_in(&mut self, ip: Option<String>, at: Timestamp) {
        self.last_sign_in_at = self.current_sign_in_at.take();
        self.last_sign_in_ip = self.current_sign_in_ip.take();
        self.current_sign_in_at = Some(at);
        self.current_sign_in_ip = ip;
    }
}

/// Whitelisted attributes accepted when creating a user.
#[derive(Debug, Clone, Default)]
pub struct UserParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub admin: Option<bool>,
    pub default_hub_id: Option<HubId>,
}

/// Step-by-step builder for [`User`].
#[derive(Debug, Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    name: Option<String>,
    email: Option<String>,
    image: Option<String>,
    admin: bool,
    created_at: Option<Timestamp>,
    default_hub_id: Option<HubId>,
}

impl UserBuilder {
    #[must_use]
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn default_hub_id(mut self, hub_id: HubId) -> Self {
        self.default_hub_id = Some(hub_id);
        self
    }

    /// Fill the builder from whitelisted request parameters.
    #[must_use]
    pub fn params(mut self, params: UserParams) -> Self {
        self.name = params.name;
        self.email = params.email;
        self.image = params.image;
        self.admin = params.admin.unwrap_or(false);
        self.default_hub_id = params.default_hub_id;
        self
    }

    /// Consume the builder, validate, and return a [`User`].
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if invariants fail.
    pub fn build(self) -> Result<User, LabHubError> {
        let user = User {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            image: self.image,
            admin: self.admin,
            last_sign_in_ip: None,
            current_sign_in_ip: None,
            last_sign_in_at: None,
            current_sign_in_at: None,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
            default_hub_id: self.default_hub_id,
        };
        user.validate()?;
        Ok(user)
    }
}

/// A plaintext API token. Only shown to the user once, never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!(
            "lh_{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        ))
    }

    /// Wrap a token presented by a client or supplied by configuration.
    #[must_use]
    pub fn from_plaintext(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digest persisted in place of the token.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Hex-encoded SHA-256 digest of an [`ApiToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Wrap a digest loaded from storage.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
