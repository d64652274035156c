//! Token secrets and the records minted by the identity provider and the platform.

pub mod record;
pub mod secret;
