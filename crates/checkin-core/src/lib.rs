//! Cross-cutting HTTP and observability plumbing shared by check-in services.

pub mod middleware;
pub mod serde;
pub mod tracing;
