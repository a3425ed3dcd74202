//! Domain types shared across the check-in services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod code;
pub mod id;
pub mod status;
