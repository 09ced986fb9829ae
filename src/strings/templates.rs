//! # Framework Documentation
//!
//! Exposes the markdown documents from `resources/` served as MCP resources.

pub const SALESFORCE_TRIGGERS: &str = include_str!("../../resources/salesforce-triggers.md");
pub const SALESFORCE_LOGGING: &str = include_str!("../../resources/salesforce-logging.md");
pub const SALESFORCE_CACHE_MANAGER: &str =
    include_str!("../../resources/salesforce-cache-manager.md");
