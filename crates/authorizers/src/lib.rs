//! # Coffer Authorizers
//!
//! The set of accounts allowed to co-sign pending transactions of a
//! checking account.
//!
//! ## Rules
//! - At most `capacity` authorizers (10 by default), creator included
//! - An account appears at most once
//! - Validation never mutates: `check_add`/`check_remove` run first
//!
//! Who may change the set, or delete a pending transaction, is decided by
//! an [`AccessPolicy`] rather than by the registry itself.

mod error;
mod policy;
mod registry;

pub use error::RegistryError;
pub use policy::{AccessPolicy, AuthorizersOrOwner, OwnerOnly};
pub use registry::{Authorizer, AuthorizerRegistry, DEFAULT_CAPACITY};
