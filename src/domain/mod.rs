//! Domain layer
//!
//! This module contains pure domain entities and business logic
//! with zero infrastructure dependencies. Domain types represent
//! the core concepts of certificate lifecycle management.
//!
//! ## Module Organization
//!
//! - `cert`: the stored certificate entity, its per-destination
//!   verification status, and listing sort orders
//! - `fingerprint`: the correlation key matching local certificates
//!   against installed-certificate inventories

pub mod cert;
pub mod fingerprint;

// Re-export main types from each module
pub use cert::{modhash_of, Cert, CertOrder, DestinationStatus, NewCert, VerifyState};
pub use fingerprint::{Fingerprint, FINGERPRINT_CRT_PREFIX_LEN};
