//! Row-level ownership checks.
//!
//! Authentication happens upstream; by the time a call reaches the library the
//! actor is a plain user id.

use crate::error::Error;
use crate::Result;

/// Allow the write only when `actor` owns the record.
pub fn require_owner(actor: &str, owner: &str, resource: &str) -> Result<()> {
    if actor == owner {
        Ok(())
    } else {
        Err(Error::permission_denied(actor, owner, resource))
    }
}

/// Reject blank user ids before they are written as owners.
pub fn validate_actor(actor: &str) -> Result<&str> {
    crate::validation::require_non_empty(actor, "user", "User id cannot be empty")
}
