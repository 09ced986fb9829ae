//! # Infrastructure Layer
//!
//! Handles interactions with external systems: the CumulusCI CLI child
//! processes and the MCP protocol surface exposed to agent clients.

pub mod mcp;
pub mod runner;
