//! Core business logic for Folio.
//!
//! This crate contains the ledger export engine with ZERO web or database
//! dependencies. Journal lines, chart of accounts, organization profile and
//! column specs are supplied by the caller as read-only snapshots.
//!
//! # Modules
//!
//! - `export` - Schema-driven layout rendering, totals, validation and signing
//! - `storage` - Persistence of released export artifacts

pub mod export;
pub mod storage;
