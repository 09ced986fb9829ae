//! # MCP Module
//!
//! The protocol-facing surface: tool registration, parameter schemas, and
//! resource serving, built on the rmcp SDK.

pub mod server;

pub use server::CciServer;
