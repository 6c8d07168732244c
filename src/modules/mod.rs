//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the object-storage client and the zip archiver used for
//! multi-file downloads.

pub mod archive;
pub mod storage;
