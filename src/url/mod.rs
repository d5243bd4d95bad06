//! URL handling module for Steeple
//!
//! This module provides URL normalization, href resolution against the
//! effective base URL, domain extraction and same-domain checks.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use normalize::{normalize_url, resolve_href};
