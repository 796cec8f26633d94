//! syncsrv - ERP schema discovery and sync-configuration reconciliation
//!
//! Asks the upstream ERP platform what entity types exist, classifies and
//! probes each one, derives synchronization metadata and idempotently
//! merges the result into a persisted configuration store without touching
//! operator-set subscription flags. A narrower surface discovers the field
//! list of a single configured entity.

pub mod api;
pub mod app_state;
pub mod catalog;
pub mod config;
pub mod erp;
pub mod error;
pub mod fallback;
pub mod fields;
pub mod labels;
pub mod planner;
pub mod probe;
pub mod routes;
pub mod scanner;
pub mod store;

pub use error::{Result, SyncSrvError};
