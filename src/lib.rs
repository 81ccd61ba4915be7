//! Client for WordPress sites running the Booknetic app plugin.
//!
//! The startup sequence is: open the [`store`], build an [`app::App`], then
//! [`bootstrap`](session::SessionManager::bootstrap) the session. Users
//! without a session add or pick a site through [`discovery`] and the
//! [`registry`], then log in.

pub mod app;
pub mod client;
pub mod config;
pub mod discovery;
pub mod home;
pub mod models;
pub mod registry;
pub mod session;
pub mod store;
