//! Business logic layer.
//!
//! Account signup/signin and the ownership-scoped link registry. Services
//! hold no state of their own; they take a pool handle and a session.

mod helpers;
mod accounts;
mod links;

pub use accounts::*;
pub use links::*;
