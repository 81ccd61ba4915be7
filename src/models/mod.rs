//! Data exchanged with the Booknetic app plugin and kept in the local store.
//!
//! # Core Concepts
//!
//! - [`SiteDescriptor`]: a site that passed the compatibility probe. Identified by its url.
//! - [`User`]: the authenticated user. Persisted as the session payload.
//! - [`AppContent`], [`Post`], [`Page`], [`Category`]: read-only site content.
//!
//! Wire types are lenient: optional fields default, unknown fields are kept.

mod content;
mod site;
mod user;

pub use content::*;
pub use site::*;
pub use user::*;
