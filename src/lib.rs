//! # qrbatch
//!
//! A Rust library for generating QR codes in bulk, bundled as a zip archive.
//!
//! `qrbatch` expands numeric ranges into codes, renders one PNG QR code per
//! code (optionally with a centered logo), and streams every image into a
//! single compressed archive that is handed back only once it is fully
//! written. A single-code variant encodes literal text and returns it inline
//! as a data URI.
//!
//! ## Features
//!
//! - Expand `begin..=end` ranges; malformed bounds silently yield no codes.
//! - Render pixel-exact `size × size` QR codes in any hex foreground color.
//! - Composite a logo at one fifth of the code width, centered.
//! - Stream entries into a deflate-compressed zip, in request order.
//! - Per-request scratch files, removed after the archive is sent.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrbatch = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Generate a batch into memory:
//!
//! ```rust
//! use std::io::Cursor;
//! use qrbatch::{BatchGenerator, QrRequest, RangeDescriptor};
//!
//! let request = QrRequest {
//!     fields: vec![RangeDescriptor::new("1", "3")],
//!     content_prefix: "ABC".to_string(),
//!     size: 200,
//!     color: "#000000".to_string(),
//!     logo_path: None,
//! };
//! let (zip, summary) = BatchGenerator::default()
//!     .write_archive(&request, Cursor::new(Vec::new()))
//!     .unwrap();
//! assert_eq!(summary.entries, 3);
//! assert!(!zip.into_inner().is_empty());
//! ```
//!
//! Generate a single code as a data URI:
//!
//! ```rust
//! use qrbatch::batch::generate_single;
//!
//! let response = generate_single("HELLO", 150, "#FF0000").unwrap();
//! assert!(response.qr_code_image_url.starts_with("data:image/png;base64,"));
//! ```
//!
//! ## Modules
//!
//! - [`range`]: Range expansion.
//! - [`qrcode`]: QR rendering on top of the `qrcode` crate.
//! - [`logo`]: Logo scaling and compositing.
//! - [`archive`]: Zip output and delete-after-send archives.
//! - [`batch`]: The batch pipeline and the single-code variant.
//! - [`request`]: Request and response payloads.
//! - [`config`], [`scratch`], [`error`], [`helper`]: Supporting pieces.

#![forbid(unsafe_code)]

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod helper;
pub mod logo;
pub mod qrcode;
pub mod range;
pub mod request;
pub mod scratch;

pub use archive::{ArchiveBuilder, FinishedArchive, ARCHIVE_FILENAME, ARCHIVE_MEDIA_TYPE};
pub use batch::{generate_single, BatchGenerator, BatchSummary, QrRequest};
pub use config::Config;
pub use error::{EncodeError, QrBatchError, Result};
pub use range::{expand_range, RangeDescriptor};
pub use request::{BatchRequestBody, ErrorResponse, SingleCodeResponse, SingleRequestBody};
