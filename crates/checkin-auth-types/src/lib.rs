//! Auth types shared across check-in services.
//!
//! Authentication itself happens at the gateway; services only read the
//! identity it injects.

pub mod identity;

/// Header carrying the authenticated owner id, injected by the gateway.
pub const OWNER_ID_HEADER: &str = "x-checkin-user-id";
