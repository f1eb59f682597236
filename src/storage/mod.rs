//! # Storage Layer
//!
//! Archive-backed persistence for certificate records. One certificate is
//! one gzip-compressed tar blob under the store root; [`CertStore`] provides
//! creation, update, and pattern/expiry-based selection over those blobs,
//! and [`archive`] is the blob codec.

pub mod archive;
pub mod store;

pub use store::{CertStore, ExpirySelect, ExpiryWindow, ARCHIVE_SUFFIX};
