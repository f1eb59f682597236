//! # Configuration Management
//!
//! This module provides typed configuration for the certificate store, the
//! reconciliation engine, and the destination inventory, loaded from
//! environment variables and an optional YAML destinations file.

pub mod settings;

pub use settings::{
    AppConfig, Destination, DestinationConfig, EngineConfig, ObservabilityConfig, StoreConfig,
};
