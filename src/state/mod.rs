//! State module for tracking URL outcomes
//!
//! # Components
//!
//! - `Status`: the outcome of a single URL, either a real HTTP status code or
//!   one of the sentinel codes for outcomes without a usable response

mod status;

pub use status::{
    Status, CONTENT_TOO_SMALL, OFF_SITE, SKIPPED, TRANSPORT_ERROR, UNINITIATED, UNSUPPORTED_SCHEME,
};
