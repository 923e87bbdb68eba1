//! Certificate ingestion pipeline for object-storage upload notifications.
//!
//! An uploaded X.509 certificate is fetched from the object store, its
//! subject common name and public key are extracted, the public key is
//! signed under a freshly generated RSA key, and the resulting record is
//! upserted into the configured key-value table. Control flow is strictly
//! linear; any stage failure aborts the invocation.

pub mod certificate;
pub mod common;
pub mod config;
pub mod event;
pub mod fetcher;
pub mod handler;
pub mod record;
pub mod signing;
