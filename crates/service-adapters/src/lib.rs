//! Outbound adapters: HTTP clients for the remote comment-storage and
//! account-profile services, an in-memory course/user directory pair for
//! assembly and tests, and the tracing-backed event sink.

pub mod events;
pub mod http;
pub mod memory;

pub use events::TracingEventSink;
pub use http::{HttpCommentClient, HttpProfileStore};
pub use memory::{InMemoryCourseStore, InMemoryUserDirectory};
