//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod forecast;
pub mod goals;
pub mod plans;
pub mod scenarios;

// Re-export all handlers for use in router
pub use forecast::*;
pub use goals::*;
pub use plans::*;
pub use scenarios::*;
