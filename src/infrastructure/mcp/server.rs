//! # CCI MCP Server
//!
//! Registers the CumulusCI tool set and the framework documentation
//! resources. Most tools return instruction strings for the calling agent;
//! `run_cci_command` is the one path that actually shells out, forwarding to
//! [`CommandRunner`] and returning its string verbatim.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

use crate::infrastructure::runner::CommandRunner;
use crate::strings::{instructions, templates};

const TRIGGERS_URI: &str = "framework://salesforce-triggers";
const LOGGING_URI: &str = "framework://salesforce-logging";
const CACHE_MANAGER_URI: &str = "framework://salesforce-cache-manager";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScratchOrgParams {
    /// Name of the org to create. Defaults to the flow's conventional name.
    pub org_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OrgParams {
    /// Name of the org. If not known, use the list_orgs tool first so the
    /// user can choose one.
    pub org_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunTestsParams {
    /// Name of the org to run tests in (default: "dev").
    pub org_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeployParams {
    /// Name of the org to deploy to. If not known, use the list_orgs tool
    /// first so the user can choose one.
    pub org_name: String,
    /// Directory containing the metadata to deploy. Must be a directory, not
    /// a filename. Omit to deploy the project default path.
    pub path: Option<String>,
    /// Pass true for a validation-only deployment (simulation/check), false
    /// for a real deployment.
    pub check_only: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenericTaskParams {
    /// Name of the CCI task to run (e.g., 'deploy', 'retrieve_changes').
    pub task_name: String,
    /// Description of what the user wants to accomplish.
    pub user_request: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunCommandParams {
    /// The cci subcommand to execute, without the 'cci' prefix
    /// (e.g., 'org list' or 'task run deploy --org dev').
    pub command: String,
}

/// Builds the `cci task run deploy` command line. The --path argument is
/// omitted entirely when no path was given.
fn deploy_command(org_name: &str, path: Option<&str>, check_only: bool) -> String {
    let mut command = format!("cci task run deploy --org {org_name} --check_only {check_only}");
    if let Some(path) = path {
        command.push_str(&format!(" --path {path}"));
    }
    command
}

/// Look up a framework document by its resource URI.
fn framework_doc(uri: &str) -> Option<&'static str> {
    match uri {
        TRIGGERS_URI => Some(templates::SALESFORCE_TRIGGERS),
        LOGGING_URI => Some(templates::SALESFORCE_LOGGING),
        CACHE_MANAGER_URI => Some(templates::SALESFORCE_CACHE_MANAGER),
        _ => None,
    }
}

fn doc_resource(uri: &str, name: &str, description: &str) -> Resource {
    let mut resource = RawResource::new(uri, name.to_string());
    resource.description = Some(description.to_string());
    resource.mime_type = Some("text/markdown".to_string());
    resource.no_annotation()
}

fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// The MCP server exposing CumulusCI operations.
#[derive(Clone)]
pub struct CciServer {
    runner: Arc<CommandRunner>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CciServer {
    pub fn new(runner: Arc<CommandRunner>) -> Self {
        Self {
            runner,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Check if CumulusCI is installed and provide installation/upgrade instructions. Run this if you encounter CCI command not found errors."
    )]
    async fn check_cci_installation(&self) -> Result<CallToolResult, McpError> {
        Ok(text_result(instructions::CHECK_INSTALLATION))
    }

    #[tool(
        description = "Create a CumulusCI scratch org for development using the dev_org flow. org_name defaults to 'dev'."
    )]
    async fn create_dev_scratch_org(
        &self,
        Parameters(params): Parameters<ScratchOrgParams>,
    ) -> Result<CallToolResult, McpError> {
        let org_name = params.org_name.unwrap_or_else(|| "dev".to_string());
        Ok(text_result(instructions::scratch_org_instructions(
            &org_name, "dev_org",
        )))
    }

    #[tool(
        description = "Create a CumulusCI scratch org for internal QA using the ci_feature_2gp flow. Used for testing a specific feature branch before merging to main. org_name defaults to 'feature'."
    )]
    async fn create_feature_scratch_org(
        &self,
        Parameters(params): Parameters<ScratchOrgParams>,
    ) -> Result<CallToolResult, McpError> {
        let org_name = params.org_name.unwrap_or_else(|| "feature".to_string());
        Ok(text_result(instructions::scratch_org_instructions(
            &org_name,
            "ci_feature_2gp",
        )))
    }

    #[tool(
        description = "Create a CumulusCI scratch org for regression or beta testing using the regression_org flow. org_name defaults to 'beta'."
    )]
    async fn create_beta_scratch_org(
        &self,
        Parameters(params): Parameters<ScratchOrgParams>,
    ) -> Result<CallToolResult, McpError> {
        let org_name = params.org_name.unwrap_or_else(|| "beta".to_string());
        Ok(text_result(instructions::scratch_org_instructions(
            &org_name,
            "regression_org",
        )))
    }

    #[tool(description = "List all orgs that are connected to CumulusCI.")]
    async fn list_orgs(&self) -> Result<CallToolResult, McpError> {
        Ok(text_result(instructions::command_instructions(
            "cci org list",
            "List all connected CumulusCI orgs",
            instructions::DEFAULT_TIMEOUT_MINUTES,
        )))
    }

    #[tool(
        description = "Run ALL unit tests and static code scans in a CumulusCI org: PMD, ESLint and Flow Scanner plus Apex, Jest and Flow tests. For a specific test, use run_generic_cci_task instead."
    )]
    async fn run_tests(
        &self,
        Parameters(params): Parameters<RunTestsParams>,
    ) -> Result<CallToolResult, McpError> {
        let org_name = params.org_name.unwrap_or_else(|| "dev".to_string());
        Ok(text_result(instructions::command_instructions(
            &format!("cci task run run_all_tests_locally --org {org_name}"),
            &format!("Run Apex tests in org '{org_name}'"),
            instructions::DEFAULT_TIMEOUT_MINUTES,
        )))
    }

    #[tool(description = "Open the specified org in a browser.")]
    async fn open_org(
        &self,
        Parameters(params): Parameters<OrgParams>,
    ) -> Result<CallToolResult, McpError> {
        let org_name = params.org_name;
        Ok(text_result(instructions::command_instructions(
            &format!("cci org browser --org {org_name}"),
            &format!("Open org '{org_name}' in browser"),
            instructions::DEFAULT_TIMEOUT_MINUTES,
        )))
    }

    #[tool(
        description = "Retrieve all metadata changes made in the specified org since the last retrieval."
    )]
    async fn retrieve_changes(
        &self,
        Parameters(params): Parameters<OrgParams>,
    ) -> Result<CallToolResult, McpError> {
        let org_name = params.org_name;
        Ok(text_result(instructions::command_instructions(
            &format!("cci task run retrieve_changes --org {org_name}"),
            &format!("Retrieves changes from org '{org_name}' locally"),
            instructions::DEFAULT_TIMEOUT_MINUTES,
        )))
    }

    #[tool(description = "Deploy local metadata to the specified org.")]
    async fn deploy(
        &self,
        Parameters(params): Parameters<DeployParams>,
    ) -> Result<CallToolResult, McpError> {
        let command = deploy_command(
            &params.org_name,
            params.path.as_deref(),
            params.check_only.unwrap_or(false),
        );
        Ok(text_result(instructions::command_instructions(
            &command,
            &format!("Deploy metadata to org '{}'", params.org_name),
            instructions::DEFAULT_TIMEOUT_MINUTES,
        )))
    }

    #[tool(
        description = "Generic tool for running any CCI task that doesn't have a dedicated tool. Checks the task exists, inspects its parameters, then runs it."
    )]
    async fn run_generic_cci_task(
        &self,
        Parameters(params): Parameters<GenericTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_result(instructions::generic_task_instructions(
            &params.task_name,
            &params.user_request,
        )))
    }

    #[tool(
        description = "Execute a cci subcommand directly on the server and return its captured output. The subcommand is run with the server's working directory; the 'cci' prefix is added automatically."
    )]
    async fn run_cci_command(
        &self,
        Parameters(params): Parameters<RunCommandParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.command.trim().is_empty() {
            return Ok(CallToolResult::error(vec![Content::text(
                "Command must not be empty",
            )]));
        }
        let output = self.runner.run(&params.command).await;
        Ok(text_result(output))
    }
}

#[tool_handler]
impl ServerHandler for CciServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "sfcore-th-dev".to_string(),
                title: Some("SFCore TH Dev".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SFCore TH Dev - MCP server for CumulusCI CLI operations".to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![
                doc_resource(
                    TRIGGERS_URI,
                    "salesforce-triggers",
                    "Salesforce trigger development guidelines for this project",
                ),
                doc_resource(
                    LOGGING_URI,
                    "salesforce-logging",
                    "Salesforce logging best practices for this project",
                ),
                doc_resource(
                    CACHE_MANAGER_URI,
                    "salesforce-cache-manager",
                    "Salesforce cache manager framework documentation for this project",
                ),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match framework_doc(&uri) {
            Some(content) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(content, uri)],
            }),
            None => Err(McpError::resource_not_found(
                "unknown framework resource",
                Some(serde_json::json!({ "uri": uri })),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_command_with_path() {
        let command = deploy_command("qa", Some("force-app/main"), true);
        assert_eq!(
            command,
            "cci task run deploy --org qa --check_only true --path force-app/main"
        );
    }

    #[test]
    fn test_deploy_command_omits_missing_path() {
        let command = deploy_command("dev", None, false);
        assert_eq!(command, "cci task run deploy --org dev --check_only false");
        assert!(!command.contains("--path"));
    }

    #[test]
    fn test_framework_doc_lookup() {
        assert!(framework_doc(TRIGGERS_URI).is_some());
        assert!(framework_doc(LOGGING_URI).is_some());
        assert!(framework_doc(CACHE_MANAGER_URI).is_some());
        assert!(framework_doc("framework://unknown").is_none());
    }

    #[test]
    fn test_run_command_params_deserialize() {
        let params: RunCommandParams =
            serde_json::from_value(serde_json::json!({ "command": "org list" }))
                .expect("deserialize params");
        assert_eq!(params.command, "org list");
    }
}
