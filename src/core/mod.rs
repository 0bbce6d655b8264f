//! core
//!
//! Core domain types and configuration for release lineage automation.
//!
//! # Modules
//!
//! - [`types`] - Strong types: LineageVersion, ReleaseLineage, RepositoryId, etc.
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Resolution of configured repository checkout paths
//!
//! # Design Principles
//!
//! - Strong typing rejects malformed input before any remote call
//! - Schemas are strict and self-describing
//! - Nothing here performs network I/O

pub mod config;
pub mod paths;
pub mod types;
