//! Authorization rules.
//!
//! Access is a pure function of the acting [`User`] and the target. Admins
//! may do everything; everyone else works through the devices they own.

use std::fmt;

use crate::error::{ForbiddenError, LabHubError};
use crate::hub::Hub;
use crate::printer::Printer;
use crate::user::User;

/// What the actor wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Destroy,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
            Self::Destroy => f.write_str("destroy"),
        }
    }
}

/// What the action targets. Nested records are checked through their parent.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Printer(&'a Printer),
    Job { printer: &'a Printer },
    Hub(&'a Hub),
    Sensor { hub: &'a Hub },
    User(&'a User),
    /// The user collection (creating accounts).
    Users,
}

impl Resource<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::Printer(_) => "printer",
            Self::Job { .. } => "job",
            Self::Hub(_) => "hub",
            Self::Sensor { .. } => "sensor",
            Self::User(_) | Self::Users => "user",
        }
    }
}

/// Whether `actor` may perform `action` on `resource`.
#[must_use]
pub fn can(actor: &User, action: Action, resource: Resource<'_>) -> bool {
    if actor.admin {
        return true;
    }
    match resource {
        Resource::Printer(printer) => printer.owner_id == actor.id,
        // Cancelling a job is reserved to admins.
        Resource::Job { printer } => action != Action::Destroy && printer.owner_id == actor.id,
        Resource::Hub(hub) | Resource::Sensor { hub } => hub.owner_id == actor.id,
        Resource::User(user) => action == Action::Read && user.id == actor.id,
        Resource::Users => false,
    }
}

/// Like [`can`], but as a guard.
///
/// # Errors
///
/// Returns [`LabHubError::Forbidden`] when the rule denies access.
pub fn authorize(actor: &User, action: Action, resource: Resource<'_>) -> Result<(), LabHubError> {
    if can(actor, action, resource) {
        Ok(())
    } else {
        Err(ForbiddenError {
            action,
            resource: resource.name(),
        }
        .into())
    }
}
