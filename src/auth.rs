//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the acting user's id. The
//! extractor only establishes *who* is calling; authorisation beyond
//! "must be signed in" is left to the routes.

pub mod config;
#[cfg(feature = "server")]
pub mod extractor;
pub mod models;
#[cfg(feature = "server")]
pub mod token;
