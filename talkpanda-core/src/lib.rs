//! Core types and utilities for talkpanda
//!
//! This crate provides the configuration, logging, error, and session
//! data model shared by the api client, the session client, and the CLI.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
