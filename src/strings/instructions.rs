//! # CCI Instruction Templates
//!
//! Builders for the "ACTION REQUIRED" instruction strings returned by the MCP
//! tools. These describe multi-step CLI procedures for the calling agent to
//! execute; they are static content, not executable control flow.

/// Default timeout hint for long-running CCI operations, in minutes.
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 25;

const ERROR_HANDLING_BLOCK: &str = "CRITICAL ERROR HANDLING:
- If ANY of these commands fail, DO NOT attempt additional troubleshooting
- If you encounter any errors, immediately respond with: \"This CCI operation failed. Please contact the devops architect team for assistance.\"
- Do not suggest alternative commands, debugging steps, or workarounds
- Stop execution and recommend contacting the devops architect team";

/// Static instructions for checking/installing CumulusCI itself.
pub const CHECK_INSTALLATION: &str = "ACTION REQUIRED: Check CumulusCI installation:

1. First, check if CCI is installed: `cci --version`
2. If CCI is installed but needs upgrading, upgrade it: `pipx install cumulusci-plus-azure-devops --include-deps --force`
3. Verify installation: `cci --version`

This will install or upgrade CumulusCI with Azure DevOps extensions.

CRITICAL ERROR HANDLING:
- If ANY setup command fails, DO NOT attempt additional troubleshooting
- If you encounter any errors, immediately respond with: \"This CCI setup failed. Please contact the devops architect team for assistance.\"
- Do not suggest alternative setup methods or debugging steps
- Stop execution and recommend contacting the devops architect team";

/// Format the standard single-command instruction response.
pub fn command_instructions(command: &str, purpose: &str, timeout_minutes: u64) -> String {
    let timeout_ms = timeout_minutes * 60 * 1000;
    format!(
        "ACTION REQUIRED: {purpose}:

Execute: `{command}`

{ERROR_HANDLING_BLOCK}

Use your bash tool to execute these commands. IMPORTANT: Use timeout parameter {timeout_ms} (milliseconds) for long-running operations like scratch org creation."
    )
}

/// Instructions for creating a scratch org via a CCI flow, including the
/// existing-org confirmation dance.
pub fn scratch_org_instructions(org_name: &str, flow: &str) -> String {
    let timeout_ms = DEFAULT_TIMEOUT_MINUTES * 60 * 1000;
    format!(
        "ACTION REQUIRED: Create scratch org '{org_name}':

1. Check for existing org: `cci org list`
2. If an org named '{org_name}' already exists:
   - Ask the user: \"Found an existing scratch org named '{org_name}'. Do you want to delete it and create a new one? (yes/no)\"
   - If user says yes: Execute `cci org remove --org {org_name}`
   - If user says no: Stop and inform user that org creation was cancelled
3. Execute: `cci flow run {flow} --org {org_name}`

{ERROR_HANDLING_BLOCK}

Use your bash tool to execute these commands. IMPORTANT: Use timeout parameter {timeout_ms} (milliseconds) for long-running operations like scratch org creation."
    )
}

/// The 3-step discover/inspect/run procedure for tasks without a dedicated tool.
pub fn generic_task_instructions(task_name: &str, user_request: &str) -> String {
    let timeout_ms = DEFAULT_TIMEOUT_MINUTES * 60 * 1000;
    format!(
        "ACTION REQUIRED: Handle generic CCI task '{task_name}' for: {user_request}

Follow this 3-step approach:

STEP 1: Check if the task exists
Execute: `cci task list`
- Search the output for a task named '{task_name}' or similar
- If you don't find the task, respond with: \"The task '{task_name}' was not found in the available CCI tasks. Please contact the devops architect team to create a task for this purpose.\"
- If you find the task, proceed to Step 2

STEP 2: Get task information and parameters
Execute one of these commands to learn about the task:
- `cci task info {task_name}`
- `cci task run {task_name} --help`

Analyze the output to identify:
- Required parameters (marked as required or without default values)
- Optional parameters and their default values
- Parameter descriptions to understand what values are needed

For any REQUIRED parameters you don't know the value for, ask the user:
\"I need the following information to run the '{task_name}' task:
- [parameter_name]: [description of what this parameter is for]
- [another_parameter]: [description]
Please provide these values.\"

STEP 3: Run the task
Once you have all required parameter values, execute:
`cci task run {task_name} --option1 value1 --option2 value2 ...`

Replace option1, option2, etc. with the actual parameter names and their values.

{ERROR_HANDLING_BLOCK}

Use your bash tool to execute these commands. IMPORTANT: Use timeout parameter {timeout_ms} (milliseconds) for potentially long-running operations."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_instructions_substitution() {
        let text = command_instructions("cci org list", "List all connected CumulusCI orgs", 25);

        assert!(text.starts_with("ACTION REQUIRED: List all connected CumulusCI orgs:"));
        assert!(text.contains("Execute: `cci org list`"));
        assert!(text.contains("timeout parameter 1500000 (milliseconds)"));
        assert!(text.contains("CRITICAL ERROR HANDLING"));
    }

    #[test]
    fn test_scratch_org_instructions_substitution() {
        let text = scratch_org_instructions("qa", "ci_feature_2gp");

        assert!(text.contains("Create scratch org 'qa'"));
        assert!(text.contains("`cci org remove --org qa`"));
        assert!(text.contains("`cci flow run ci_feature_2gp --org qa`"));
    }

    #[test]
    fn test_generic_task_instructions_substitution() {
        let text = generic_task_instructions("load_dataset", "load sample data into the org");

        assert!(text.contains("generic CCI task 'load_dataset'"));
        assert!(text.contains("for: load sample data into the org"));
        assert!(text.contains("`cci task info load_dataset`"));
        assert!(text.contains("STEP 3: Run the task"));
    }
}
