//! Build-time helpers for the web front end: Lighthouse report digests, PWA
//! icon generation and the deployed `version.json` descriptor.

pub mod error;
pub mod icons;
pub mod lighthouse;
pub mod version;

pub use error::ReleaseToolError;
