//! # certplane
//!
//! certplane manages the distribution half of the TLS certificate
//! lifecycle: certificates live as versioned tar archives in a local store,
//! and a reconciliation engine compares that desired state against what
//! remote destinations (SSL-serving infrastructure exposing a key/value
//! HTTP inventory) actually have installed, concurrently and with
//! per-destination failure isolation.
//!
//! ## Architecture
//!
//! The system follows a layered flow:
//!
//! ```text
//! CertStore → selected Certs → Reconciler → BatchClient → Destinations
//!     ↓                            ↓
//! Archive Codec          Per-destination status merge
//! ```
//!
//! ## Core Components
//!
//! - **CertStore**: tar-archive-backed storage with glob- and expiry-based
//!   certificate selection
//! - **Reconciler**: per-destination-family protocol that lists, fetches,
//!   installs, and verifies certificate material
//! - **BatchClient**: batched concurrent HTTP execution with per-slot
//!   failure isolation, implemented over reqwest
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use certplane::client::HttpBatchClient;
//! use certplane::{reconciler_for, AppConfig, CertStore, DestinationKind, ExpirySelect, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     certplane::init_tracing(&config.observability)?;
//!
//!     let store = CertStore::open(&config.store.root)?;
//!     let certs = store.load_many(&["*.example.com"], ExpirySelect::within(30))?;
//!
//!     let client = Arc::new(HttpBatchClient::new(config.engine.call_timeout())?);
//!     let engine = reconciler_for(DestinationKind::ServerKeys, client, config.engine.clone());
//!     let destinations = config.destinations_for(DestinationKind::ServerKeys);
//!
//!     engine.check_connectivity(&destinations).await?;
//!     let certs = engine.fetch_status(certs, &destinations).await?;
//!     for cert in &certs {
//!         store.update(cert)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod reconcile;
pub mod storage;
pub mod utils;

// Re-export commonly used types and traits
pub use config::{AppConfig, Destination, EngineConfig, ObservabilityConfig, StoreConfig};
pub use domain::{Cert, CertOrder, DestinationStatus, Fingerprint, NewCert, VerifyState};
pub use errors::{Error, Result};
pub use observability::init_tracing;
pub use reconcile::{reconciler_for, DestinationKind, Reconciler, ServerKeysReconciler};
pub use storage::{CertStore, ExpirySelect, ExpiryWindow};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
