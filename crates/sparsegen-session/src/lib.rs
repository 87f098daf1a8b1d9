#![deny(clippy::correctness)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic,
    clippy::nursery,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![doc = include_str!("../README.md")]

pub mod properties;
mod session;

pub use session::{with_session, Session, SessionConfig, SessionGuard, DRIVER_PORT_KEY, HOST_PORT_KEY};

/// The version of the crate.
pub const VERSION: &str = "0.1.0";
