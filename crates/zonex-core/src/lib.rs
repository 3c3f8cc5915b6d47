//! Core types for the zonex DNS reconnaissance engine.
//!
//! This crate provides the record and finding types shared across zonex:
//!
//! - **Types**: the normalized [`DnsRecord`] produced by every acquisition
//!   technique and the [`Finding`] emitted by probes and analyzers
//! - **Errors**: top-level error handling with [`ZonexError`]
//!
//! # Example
//!
//! ```rust
//! use zonex_core::{dedup_records, DnsRecord, RecordKind};
//!
//! let records = vec![
//!     DnsRecord::new("www.example.com", RecordKind::A, "192.0.2.1"),
//!     DnsRecord::new("www.example.com", RecordKind::A, "192.0.2.1"),
//! ];
//! assert_eq!(dedup_records(records).len(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/zonex-core/0.4.0")]

mod error;
pub mod types;

pub use error::{Result, ZonexError};
pub use types::*;
