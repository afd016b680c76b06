//! Domain models, port traits, and the error taxonomy for the course
//! discussion API layer.
//!
//! Everything stateful lives behind the ports: the remote comment-storage
//! service, the course/enrollment store, the user directory, and the account
//! profile store. This crate defines the contracts; adapters implement them.

pub mod error;
pub mod models;
pub mod ports;

pub use error::*;
pub use models::*;
pub use ports::*;
