//! Shared test utilities for the dvln workspace.
//!
//! This crate is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`capture`]: in-memory writers standing in for the screen and stderr
//! - [`home`]: [`TestHome`] builder for a fake home directory with a user config

pub mod capture;
pub mod home;

pub use capture::CaptureBuffer;
pub use home::TestHome;
