//! Destination reconciliation engine.
//!
//! A destination family implements [`Reconciler`]: the protocol that lists,
//! fetches, installs, and verifies certificate material against the remote
//! destinations of that family. Engines drive all destination I/O through
//! the [`BatchClient`](crate::client::BatchClient) capability and merge what
//! destinations report back into each certificate's status map in one
//! sequential step, so no two concurrent calls ever touch the same
//! certificate.
//!
//! One family exists today: [`server_keys::ServerKeysReconciler`], a
//! hierarchical HTTP key/value inventory rooted at `ssl/server_keys/`.
//! [`DestinationKind`] is the closed set of families and [`reconciler_for`]
//! constructs the engine for one of them.

pub mod server_keys;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::BatchClient;
use crate::config::{Destination, EngineConfig};
use crate::domain::Cert;
use crate::errors::Result;

pub use server_keys::ServerKeysReconciler;

/// Closed set of destination families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    /// Hierarchical HTTP key/value inventory of SSL server keys.
    ServerKeys,
}

impl DestinationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerKeys => "server_keys",
        }
    }
}

impl FromStr for DestinationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "server_keys" => Ok(Self::ServerKeys),
            _ => Err(format!("Unknown destination kind: {}", s)),
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-destination-family reconciliation protocol.
///
/// The certificates passed in are the desired state; what a destination
/// actually serves is the installed state. Implementations compare the two
/// by content fingerprint and record the outcome per destination on each
/// certificate. Per-(certificate, destination) status progresses
/// `unknown -> pending` after [`install`](Reconciler::install) and on to
/// `matched` or `mismatched` after [`fetch_status`](Reconciler::fetch_status);
/// a mismatch is a legitimate terminal result surfaced to the caller, never
/// retried by the engine.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// The destination family this engine speaks to.
    fn kind(&self) -> DestinationKind;

    /// Probe every destination once, concurrently.
    ///
    /// Any timeout or connection-level probe failure is wrapped into one
    /// [`Error::Connectivity`](crate::errors::Error::Connectivity) carrying
    /// the underlying cause; any other failure propagates unchanged.
    async fn check_connectivity(&self, destinations: &[Destination]) -> Result<bool>;

    /// Compare the desired certificates against installed state and merge
    /// what each destination reports into the certificates' status maps.
    async fn fetch_status(
        &self,
        certs: Vec<Cert>,
        destinations: &[Destination],
    ) -> Result<Vec<Cert>>;

    /// Write every certificate to every destination, then verify what is
    /// actually installed by fetching it back.
    async fn install(
        &self,
        note: &str,
        certs: Vec<Cert>,
        destinations: &[Destination],
    ) -> Result<Vec<Cert>>;

    /// Replace installed certificates in place.
    ///
    /// No implemented family supports this; it fails with
    /// [`Error::Unsupported`](crate::errors::Error::Unsupported).
    async fn update(&self, certs: Vec<Cert>, destinations: &[Destination]) -> Result<Vec<Cert>>;

    /// Remove installed certificates.
    ///
    /// No implemented family supports this; it fails with
    /// [`Error::Unsupported`](crate::errors::Error::Unsupported).
    async fn remove(&self, certs: Vec<Cert>, destinations: &[Destination]) -> Result<Vec<Cert>>;
}

/// Construct the reconciliation engine for a destination family.
pub fn reconciler_for(
    kind: DestinationKind,
    client: Arc<dyn BatchClient>,
    config: EngineConfig,
) -> Box<dyn Reconciler> {
    match kind {
        DestinationKind::ServerKeys => Box::new(ServerKeysReconciler::new(client, config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Call, CallRequest};

    struct NullClient;

    #[async_trait]
    impl BatchClient for NullClient {
        async fn submit(&self, _requests: Vec<CallRequest>) -> Vec<Call> {
            Vec::new()
        }
    }

    #[test]
    fn test_destination_kind_roundtrip() {
        let kind: DestinationKind = "server_keys".parse().unwrap();
        assert_eq!(kind, DestinationKind::ServerKeys);
        assert_eq!(kind.to_string(), "server_keys");
        assert!("zeus".parse::<DestinationKind>().is_err());
    }

    #[test]
    fn test_destination_kind_serde_tag() {
        let json = serde_json::to_string(&DestinationKind::ServerKeys).unwrap();
        assert_eq!(json, "\"server_keys\"");
        let parsed: DestinationKind = serde_json::from_str("\"server_keys\"").unwrap();
        assert_eq!(parsed, DestinationKind::ServerKeys);
    }

    #[test]
    fn test_reconciler_for_builds_the_family_engine() {
        let engine =
            reconciler_for(DestinationKind::ServerKeys, Arc::new(NullClient), EngineConfig::default());
        assert_eq!(engine.kind(), DestinationKind::ServerKeys);
    }
}
