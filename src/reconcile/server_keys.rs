//! SSL server-keys destination family.
//!
//! Destinations of this family expose a hierarchical HTTP key/value
//! inventory rooted at [`COLLECTION_PATH`]: `GET` on the collection lists
//! the installed certificate names, `GET` on a name yields one record of
//! `{properties: {basic: {private, request, public, note}}}`, and `PUT` on
//! a name creates or overwrites that record. Installed state is always
//! verified by re-reading; the write response itself is never trusted.
//!
//! Destination APIs sit on internal management networks, so the batch
//! client talking to them runs with relaxed certificate verification.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::client::{BatchClient, CallError, CallRequest};
use crate::config::{Destination, EngineConfig};
use crate::domain::{Cert, DestinationStatus, Fingerprint};
use crate::errors::{Error, Result};
use crate::utils::normalize_newlines;

use super::{DestinationKind, Reconciler};

/// Collection path of the server-keys inventory.
pub const COLLECTION_PATH: &str = "ssl/server_keys/";

/// Sentinel recorded when a destination omits a PEM field from a record.
pub const MISSING_FIELD: &str = "missing";

fn missing_field() -> String {
    MISSING_FIELD.to_string()
}

/// One inventory record on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerKeyRecord {
    properties: ServerKeyProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerKeyProperties {
    basic: ServerKeyBasic,
}

/// The `basic` property group of a record.
///
/// Destinations are free to omit fields: a missing PEM field decodes to the
/// [`MISSING_FIELD`] sentinel and a missing note to the empty string, so a
/// sparse record never aborts a fetch on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerKeyBasic {
    #[serde(default = "missing_field")]
    private: String,
    #[serde(default = "missing_field")]
    request: String,
    #[serde(default = "missing_field")]
    public: String,
    #[serde(default)]
    note: String,
}

impl ServerKeyRecord {
    fn compose(key: &str, csr: &str, crt: &str, note: &str) -> Self {
        Self {
            properties: ServerKeyProperties {
                basic: ServerKeyBasic {
                    private: key.to_string(),
                    request: csr.to_string(),
                    public: crt.to_string(),
                    note: note.to_string(),
                },
            },
        }
    }
}

impl ServerKeyBasic {
    /// Normalize the line-ending convention of the three PEM fields.
    ///
    /// Destinations echo records with CRLF endings while local blobs use
    /// LF; all comparison happens on the normalized form.
    fn into_normalized(self) -> Self {
        Self {
            private: normalize_newlines(&self.private),
            request: normalize_newlines(&self.request),
            public: normalize_newlines(&self.public),
            note: self.note,
        }
    }
}

/// Collection listing on the wire. A listing without `children` is
/// malformed.
#[derive(Debug, Deserialize)]
struct Listing {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    name: String,
}

/// Installed records grouped by fingerprint, then by destination name.
type InstalledDetails = HashMap<Fingerprint, BTreeMap<String, ServerKeyBasic>>;

/// Reconciliation engine for the server-keys family.
pub struct ServerKeysReconciler {
    client: Arc<dyn BatchClient>,
    config: EngineConfig,
}

impl ServerKeysReconciler {
    pub fn new(client: Arc<dyn BatchClient>, config: EngineConfig) -> Self {
        Self { client, config }
    }

    fn detail_path(name: &str) -> String {
        format!("{}{}", COLLECTION_PATH, name)
    }

    /// List the collection on every destination concurrently and keep the
    /// (name, destination) pairs whose name belongs to a desired
    /// certificate.
    ///
    /// A failed or non-200 listing on any destination fails the whole call;
    /// callers needing per-destination fault isolation at this stage must
    /// wrap their own retry around it.
    async fn installed_summary(
        &self,
        certs: &[Cert],
        destinations: &[Destination],
    ) -> Result<Vec<(String, Destination)>> {
        let desired: HashSet<&str> = certs.iter().map(|cert| cert.common_name.as_str()).collect();

        let requests = destinations
            .iter()
            .map(|destination| {
                CallRequest::get(destination.url_for(COLLECTION_PATH))
                    .with_timeout(self.config.listing_timeout())
            })
            .collect();
        let calls = self.client.submit(requests).await;

        let mut summary = Vec::new();
        for (destination, call) in destinations.iter().zip(calls) {
            let response = match call.outcome {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(
                        destination = %destination.name,
                        url = %call.request.url,
                        error = %error,
                        "Inventory listing failed"
                    );
                    return Err(Error::transport(&destination.name, error));
                }
            };
            if response.status != 200 {
                return Err(Error::inventory_list(
                    &destination.name,
                    call.request.method.as_str(),
                    &call.request.url,
                    response.status,
                ));
            }
            let listing: Listing = serde_json::from_value(response.body.clone()).map_err(|err| {
                tracing::warn!(
                    destination = %destination.name,
                    url = %call.request.url,
                    body = %response.body,
                    "Malformed inventory listing"
                );
                Error::transport(
                    &destination.name,
                    CallError::body(call.request.method.as_str(), &call.request.url, err.to_string()),
                )
            })?;
            for child in listing.children {
                if desired.contains(child.name.as_str()) {
                    summary.push((child.name, destination.clone()));
                }
            }
        }
        tracing::debug!(pairs = summary.len(), "Collected installed-certificate summary");
        Ok(summary)
    }

    /// Fetch the detail record of every (name, destination) pair as one
    /// flat batch and group the decoded records by fingerprint.
    ///
    /// A transport failure fails only its own pair. A record that fetches
    /// but does not decode fails the whole call, after its request and
    /// response context is logged.
    async fn installed_details(
        &self,
        summary: Vec<(String, Destination)>,
    ) -> Result<InstalledDetails> {
        let requests = summary
            .iter()
            .map(|(name, destination)| {
                CallRequest::get(destination.url_for(&Self::detail_path(name)))
                    .with_timeout(self.config.call_timeout())
            })
            .collect();
        let calls = self.client.submit(requests).await;

        let mut details = InstalledDetails::new();
        for ((name, destination), call) in summary.into_iter().zip(calls) {
            let response = match call.outcome {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(
                        destination = %destination.name,
                        cert_name = %name,
                        error = %error,
                        "Detail fetch failed, skipping this pair"
                    );
                    continue;
                }
            };
            let record: ServerKeyRecord =
                serde_json::from_value(response.body.clone()).map_err(|err| {
                    tracing::debug!(url = %call.request.url, "Detail record did not decode");
                    tracing::debug!(body = %response.body, "Detail record body");
                    Error::transport(
                        &destination.name,
                        CallError::body(
                            call.request.method.as_str(),
                            &call.request.url,
                            err.to_string(),
                        ),
                    )
                })?;
            let basic = record.properties.basic.into_normalized();
            details
                .entry(Fingerprint::new(&name, &basic.public))
                .or_default()
                .insert(destination.name, basic);
        }
        Ok(details)
    }
}

#[async_trait]
impl Reconciler for ServerKeysReconciler {
    fn kind(&self) -> DestinationKind {
        DestinationKind::ServerKeys
    }

    /// Probe every destination root once, concurrently, with the short
    /// probe timeout.
    ///
    /// Reachability is all that is probed: response status is ignored, and
    /// a destination answering with a body the client cannot digest has
    /// still answered. Probe timeouts and connection failures become one
    /// [`Error::Connectivity`]; any other slot failure propagates as
    /// [`Error::Transport`].
    async fn check_connectivity(&self, destinations: &[Destination]) -> Result<bool> {
        tracing::debug!(destinations = destinations.len(), "Probing destination connectivity");
        let requests = destinations
            .iter()
            .map(|destination| {
                CallRequest::get(destination.url_for("")).with_timeout(self.config.probe_timeout())
            })
            .collect();
        let calls = self.client.submit(requests).await;

        for (destination, call) in destinations.iter().zip(calls) {
            match call.outcome {
                Ok(_) => {}
                Err(CallError::Body { .. }) => {}
                Err(error) if error.is_unreachable() => {
                    tracing::warn!(
                        destination = %destination.name,
                        error = %error,
                        "Destination probe failed"
                    );
                    return Err(Error::connectivity(&destination.name, error));
                }
                Err(error) => return Err(Error::transport(&destination.name, error)),
            }
        }
        Ok(true)
    }

    async fn fetch_status(
        &self,
        mut certs: Vec<Cert>,
        destinations: &[Destination],
    ) -> Result<Vec<Cert>> {
        tracing::debug!(
            certs = certs.len(),
            destinations = destinations.len(),
            "Fetching installed certificate status"
        );
        let summary = self.installed_summary(&certs, destinations).await?;
        let details = self.installed_details(summary).await?;

        // Single sequential merge after all concurrent calls returned.
        let checked_at = Utc::now();
        for cert in &mut certs {
            let Some(records) = details.get(&cert.fingerprint()) else {
                continue;
            };
            for (destination_name, record) in records {
                let matched = record.public == cert.crt;
                cert.merge_destination(
                    destination_name.as_str(),
                    DestinationStatus::verified(matched, record.note.as_str(), checked_at),
                );
            }
        }
        Ok(certs)
    }

    async fn install(
        &self,
        note: &str,
        mut certs: Vec<Cert>,
        destinations: &[Destination],
    ) -> Result<Vec<Cert>> {
        tracing::info!(
            certs = certs.len(),
            destinations = destinations.len(),
            note = %note,
            "Installing certificates"
        );

        let mut requests = Vec::with_capacity(certs.len() * destinations.len());
        for cert in &certs {
            let body = serde_json::to_value(ServerKeyRecord::compose(
                &cert.key, &cert.csr, &cert.crt, note,
            ))?;
            for destination in destinations {
                requests.push(
                    CallRequest::put(
                        destination.url_for(&Self::detail_path(&cert.common_name)),
                        body.clone(),
                    )
                    .with_timeout(self.config.call_timeout()),
                );
            }
        }
        let calls = self.client.submit(requests).await;
        for call in &calls {
            match &call.outcome {
                Err(error) => {
                    tracing::warn!(url = %call.request.url, error = %error, "Certificate write failed")
                }
                Ok(response) if !response.is_success() => {
                    tracing::warn!(
                        url = %call.request.url,
                        status = response.status,
                        "Certificate write rejected"
                    )
                }
                Ok(_) => {}
            }
        }

        // The write response is never trusted, in either direction: every
        // attempted pair starts out pending and the re-read below resolves
        // what each destination actually serves.
        for cert in &mut certs {
            for destination in destinations {
                cert.merge_destination(destination.name.as_str(), DestinationStatus::pending(note));
            }
        }

        self.fetch_status(certs, destinations).await
    }

    async fn update(&self, _certs: Vec<Cert>, _destinations: &[Destination]) -> Result<Vec<Cert>> {
        Err(Error::unsupported(self.kind().as_str(), "update"))
    }

    async fn remove(&self, _certs: Vec<Cert>, _destinations: &[Destination]) -> Result<Vec<Cert>> {
        Err(Error::unsupported(self.kind().as_str(), "remove"))
    }
}
