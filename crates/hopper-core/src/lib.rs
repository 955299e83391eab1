//! # hopper-core
//!
//! Shared plumbing for the Hopper crates.
//!
//! - **Logging**: [`logging::init_subscriber`] and the in-memory
//!   [`logging::test_utils::capture_logs`] layer used by tests
//! - **Text**: [`text::expand_variables`] for `$VAR` / `${VAR}` / `~`
//!   resolution in command lines
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by hopper-actions and the hopper binary.

#![deny(unsafe_code)]

pub mod logging;
pub mod text;
