//! Integration tests for the archive-backed certificate store.
//!
//! These tests exercise the store against a real temporary directory:
//! round-trips through the archive codec, glob selection, the expiry
//! filters, and archive path decomposition.

mod common;

use std::path::Path;

use chrono::Duration;
use tempfile::TempDir;

use certplane::domain::DestinationStatus;
use certplane::storage::{CertStore, ExpirySelect, ARCHIVE_SUFFIX};
use certplane::utils::sanitize;
use certplane::Error;

use common::new_cert;

#[test]
fn create_then_load_preserves_the_record() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();

    let mut input = new_cert("www.example.com", 365);
    input.sans = vec!["www.example.com".to_string(), "api.example.com".to_string()];
    let created = store.create(input).unwrap();

    let loaded = store.load("www.example.com").unwrap();
    assert_eq!(created, loaded);
    assert_eq!(loaded.timestamp, store.timestamp());
    // Single-certificate load returns sans as stored.
    assert_eq!(loaded.sans, vec!["www.example.com", "api.example.com"]);
}

#[test]
fn update_persists_destination_status() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();

    let mut cert = store.create(new_cert("www.example.com", 365)).unwrap();
    cert.merge_destination("lb-east", DestinationStatus::pending("rollout"));
    store.update(&cert).unwrap();

    let loaded = store.load("www.example.com").unwrap();
    assert_eq!(loaded.destinations.len(), 1);
    assert_eq!(loaded.destinations["lb-east"].note, "rollout");
}

#[test]
fn load_many_unions_patterns_and_sorts_ascending() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();
    for name in ["www.example.com", "api.example.com", "www.example.org", "db.internal"] {
        store.create(new_cert(name, 365)).unwrap();
    }

    let certs = store
        .load_many(&["*.example.com", "db.*"], ExpirySelect::All)
        .unwrap();
    let names: Vec<_> = certs.iter().map(|cert| cert.common_name.as_str()).collect();
    assert_eq!(names, vec!["api.example.com", "db.internal", "www.example.com"]);

    // No patterns selects nothing.
    let certs = store.load_many::<&str>(&[], ExpirySelect::All).unwrap();
    assert!(certs.is_empty());
}

#[test]
fn load_many_canonicalizes_sans_ascending() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();

    let mut input = new_cert("www.example.com", 365);
    input.sans = vec![
        "zz.example.com".to_string(),
        "api.example.com".to_string(),
        "mail.example.com".to_string(),
    ];
    store.create(input).unwrap();

    let certs = store.load_many(&["www.*"], ExpirySelect::All).unwrap();
    assert_eq!(certs[0].sans, vec!["api.example.com", "mail.example.com", "zz.example.com"]);
}

#[test]
fn within_window_keeps_only_certs_expiring_inside_it() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();
    store.create(new_cert("soon.example.com", 5)).unwrap();
    store.create(new_cert("later.example.com", 40)).unwrap();
    store.create(new_cert("gone.example.com", -5)).unwrap();

    let certs = store.load_many(&["*"], ExpirySelect::within(30)).unwrap();
    let names: Vec<_> = certs.iter().map(|cert| cert.common_name.as_str()).collect();
    assert_eq!(names, vec!["soon.example.com"]);
}

#[test]
fn within_window_accepts_day_counts_and_durations() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();
    store.create(new_cert("soon.example.com", 5)).unwrap();

    let by_days = store.load_many(&["*"], ExpirySelect::within(30)).unwrap();
    let by_duration = store.load_many(&["*"], ExpirySelect::within(Duration::days(30))).unwrap();
    assert_eq!(by_days, by_duration);
    assert_eq!(by_days.len(), 1);

    // An explicit duration below the remaining lifetime selects nothing.
    let tight = store.load_many(&["*"], ExpirySelect::within(Duration::hours(1))).unwrap();
    assert!(tight.is_empty());
}

/// Locks the comparison direction of the `Expired` filter.
///
/// The predicate is literally `expiry > store timestamp`: it keeps
/// certificates that expire after the store was opened and drops ones that
/// already expired. The direction reads inverted relative to the filter's
/// name; this test exists so that inverting it is a visible decision.
#[test]
fn expired_filter_keeps_certs_expiring_after_store_open() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();
    store.create(new_cert("future.example.com", 30)).unwrap();
    store.create(new_cert("past.example.com", -30)).unwrap();

    let certs = store.load_many(&["*"], ExpirySelect::Expired).unwrap();
    let names: Vec<_> = certs.iter().map(|cert| cert.common_name.as_str()).collect();
    assert_eq!(names, vec!["future.example.com"]);
}

#[test]
fn decompose_rejects_foreign_paths() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();

    let (root, name) = store.decompose(&store.path_for("www.example.com")).unwrap();
    assert_eq!(root, store.root());
    assert_eq!(name, "www.example.com");

    for path in [
        Path::new("/etc/ssl/www.example.com.tar.gz").to_path_buf(),
        store.root().join("www.example.com.tgz"),
        store.root().join("www.example.com"),
    ] {
        let err = store.decompose(&path).unwrap_err();
        match err {
            Error::Decompose { path: offending } => {
                assert_eq!(offending, path.to_string_lossy());
            }
            other => panic!("expected a decompose error, got {:?}", other),
        }
    }
}

#[test]
fn sanitize_output_drives_store_selection() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();
    store.create(new_cert("www.example.com", 365)).unwrap();
    store.create(new_cert("www.example.org", 365)).unwrap();

    // A raw archive file name widens into a prefix pattern.
    let pattern = sanitize("www.example.com.tar.gz", ARCHIVE_SUFFIX);
    assert_eq!(pattern, "www.example.com*");
    let certs = store.load_many(&[pattern], ExpirySelect::All).unwrap();
    assert_eq!(certs.len(), 1);
    assert_eq!(certs[0].common_name, "www.example.com");

    // A bare name widens the same way and still selects exactly its cert.
    let pattern = sanitize("www.example.org", ARCHIVE_SUFFIX);
    let certs = store.load_many(&[pattern], ExpirySelect::All).unwrap();
    assert_eq!(certs.len(), 1);
    assert_eq!(certs[0].common_name, "www.example.org");
}

#[test]
fn load_failure_surfaces_as_not_found() {
    let dir = TempDir::new().unwrap();
    let store = CertStore::open(dir.path()).unwrap();

    let err = store.load("absent.example.com").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(err.to_string(), "Certificate not found: 'absent.example.com'");

    std::fs::write(store.path_for("broken.example.com"), b"garbage").unwrap();
    let err = store.load("broken.example.com").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn two_store_instances_have_independent_timestamps() {
    let dir = TempDir::new().unwrap();
    let first = CertStore::open(dir.path()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let second = CertStore::open(dir.path()).unwrap();

    assert!(second.timestamp() > first.timestamp());

    // Certs created through each store carry that store's timestamp.
    let cert = second.create(new_cert("www.example.com", 365)).unwrap();
    assert_eq!(cert.timestamp, second.timestamp());
    assert!(cert.timestamp > first.timestamp());

    let reloaded = first.load("www.example.com").unwrap();
    assert_eq!(reloaded.timestamp, second.timestamp());
}
