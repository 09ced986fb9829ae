//! # Domain Layer
//!
//! Core definitions and configuration types for the server,
//! independent of the MCP framework and process-spawning machinery.

pub mod config;
