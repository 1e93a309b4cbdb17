//! Core types and trait definitions for the Campus directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod course;
pub mod error;
pub mod gate;
pub mod identity;
pub mod record;
pub mod role;
pub mod signin;
pub mod store;

pub use error::{Error, Result};
