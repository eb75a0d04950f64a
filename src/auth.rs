//! Auth-domain identifiers and credential models.

pub mod credential;
pub mod identity;

pub use credential::*;
pub use identity::*;
