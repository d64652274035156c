//! Auth-domain identifiers, login methods, and token models.

pub mod id;
pub mod login;
pub mod token;

pub use id::*;
pub use login::*;
pub use token::{record::*, secret::*};
