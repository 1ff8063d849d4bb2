//! Product image ingestion for the storefront catalog
//!
//! Downloads product images from arbitrary URLs, stores the originals in
//! object storage, and generates a resized thumbnail for the main image.

pub mod error;
pub mod fetch;
pub mod image;
pub mod mime;
pub mod models;
pub mod naming;
pub mod pipeline;
pub mod request;
pub mod storage;

pub use error::{Error, Result};
