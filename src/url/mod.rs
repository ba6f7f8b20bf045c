//! URL handling module
//!
//! This module provides URL canonicalization, link resolution and robots.txt
//! origin extraction.

mod domain;
mod normalize;

pub use domain::{robots_origin, robots_url};
pub use normalize::{canonicalize_url, resolve_link};
