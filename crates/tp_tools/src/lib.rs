//! # Turning Point Authoring Tools
//!
//! Command-line tools for template authors:
//! - Roster validation
//! - Template export

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod export;
pub mod validate;
