//! Shared fixtures for integration tests
//!
//! Each test binary compiles this module separately and uses a subset of it.

#![allow(dead_code)]

pub mod config;
pub mod images;
pub mod runtime;
pub mod server;
