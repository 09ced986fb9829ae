//! # Strings Module
//!
//! Centralizes the instruction templates and framework documentation served
//! by the MCP tools and resources. Ensures consistency in messaging and
//! easier updates.

pub mod instructions;
pub mod templates;
