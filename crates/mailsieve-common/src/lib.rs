//! MailSieve Common - Shared types and utilities
//!
//! This crate provides the configuration and error types shared across
//! all MailSieve components.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
