//! Adapters to the external services used by the mealdrop core.
//!
//! Responsibilities:
//! - Resolve delivery and meal center addresses through an HTTP geocoder.
//! - Provide deterministic stand-ins for tests.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `mealdrop-core`).
//! - Expose synchronous collaborators; async clients stay internal.

pub mod geocoding;
