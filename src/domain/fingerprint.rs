//! Certificate identity fingerprints.
//!
//! Local and remote certificate records are correlated by fingerprint: the
//! common name plus a fixed-length prefix of the certificate body. The prefix
//! keeps listing/detail correlation cheap without shipping whole PEM blobs
//! through every comparison.

use serde::Serialize;

/// Number of leading certificate characters included in a [`Fingerprint`].
///
/// 40 characters reaches past the PEM header into the body, which is enough
/// to separate unrelated certificates in practice. Two certificates sharing
/// this prefix are treated as one fingerprint group and disambiguated by the
/// full-body comparison that computes the matched flag.
pub const FINGERPRINT_CRT_PREFIX_LEN: usize = 40;

/// Grouping key for installed-certificate correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint {
    /// Certificate common name as reported by the inventory.
    pub common_name: String,
    /// First [`FINGERPRINT_CRT_PREFIX_LEN`] characters of the certificate body.
    pub crt_prefix: String,
}

impl Fingerprint {
    /// Build a fingerprint from a common name and certificate text.
    pub fn new(common_name: impl Into<String>, crt: &str) -> Self {
        Self {
            common_name: common_name.into(),
            crt_prefix: crt.chars().take(FINGERPRINT_CRT_PREFIX_LEN).collect(),
        }
    }
}
