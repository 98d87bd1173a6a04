//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **URI validation**: set-time checks for writer fields (absolute URIs,
//!   http(s) URLs, RFC 4151 tag ids)
//! - **Text processing**: RSS author-string composition and required-field
//!   trimming

pub(crate) mod text;
pub(crate) mod uri;
