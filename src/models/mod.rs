//! Data models shared with the remote backend.
//!
//! These models match the backend interface exactly so they can travel over the RPC wire unchanged.

mod form;
mod member;
mod profile;

pub use form::*;
pub use member::*;
pub use profile::*;
