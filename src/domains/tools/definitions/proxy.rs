//! Generic proxy tool.
//!
//! A proxy tool validates its arguments, resolves them to a resource path on
//! the LENS API, fetches it and wraps the upstream `result` in a text block.

use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::lens::{ResourceFetcher, ResourcePath};
use crate::domains::tools::envelope::to_envelope;
use crate::domains::tools::error::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for tools scoped to a single account.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AccountParams {
    /// Account Global Ultimate DUNS number.
    #[schemars(description = "Account Global ultimate duns number (uduns)")]
    pub uduns: String,
}

/// Parameters for tools that take no input.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Which parameters a proxy tool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolParameters {
    /// No parameters; the resource path is fixed.
    None,
    /// A required `uduns` string appended to the resource path.
    Account,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// A read-only tool forwarding to one LENS resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyTool {
    name: &'static str,
    description: &'static str,
    resource: &'static str,
    parameters: ToolParameters,
}

impl ProxyTool {
    /// Declare a tool.
    pub const fn new(
        name: &'static str,
        description: &'static str,
        resource: &'static str,
        parameters: ToolParameters,
    ) -> Self {
        Self {
            name,
            description,
            resource,
            parameters,
        }
    }

    /// Declare a tool without parameters.
    pub const fn listing(
        name: &'static str,
        description: &'static str,
        resource: &'static str,
    ) -> Self {
        Self::new(name, description, resource, ToolParameters::None)
    }

    /// Declare a tool taking a `uduns` account parameter.
    pub const fn per_account(
        name: &'static str,
        description: &'static str,
        resource: &'static str,
    ) -> Self {
        Self::new(name, description, resource, ToolParameters::Account)
    }

    /// Tool name as registered in MCP.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Tool description shown to clients.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// First segment of the upstream resource path.
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Parameters accepted by this tool.
    pub fn parameters(&self) -> ToolParameters {
        self.parameters
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool(&self) -> Tool {
        let input_schema = match self.parameters {
            ToolParameters::None => cached_schema_for_type::<NoParams>(),
            ToolParameters::Account => cached_schema_for_type::<AccountParams>(),
        };

        Tool {
            name: self.name.into(),
            description: Some(self.description.into()),
            input_schema,
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Validate the arguments and build the upstream resource path.
    ///
    /// Extra arguments are ignored.
    pub fn resource_path(&self, arguments: &JsonObject) -> Result<ResourcePath, ToolError> {
        let path = ResourcePath::new(self.resource);

        match self.parameters {
            ToolParameters::None => Ok(path),
            ToolParameters::Account => {
                let params: AccountParams =
                    serde_json::from_value(serde_json::Value::Object(arguments.clone()))
                        .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

                if params.uduns.trim().is_empty() {
                    return Err(ToolError::invalid_arguments(
                        "Parameter 'uduns' must not be empty",
                    ));
                }

                Ok(path.with_param(params.uduns))
            }
        }
    }

    /// Execute the tool against the given fetcher.
    #[instrument(skip(self, arguments, fetcher), fields(tool = self.name))]
    pub async fn call(
        &self,
        arguments: &JsonObject,
        fetcher: &dyn ResourceFetcher,
    ) -> Result<CallToolResult, ToolError> {
        let path = self.resource_path(arguments)?;
        info!("Fetching LENS resource: {}", path);

        let value = fetcher.fetch_resource(&path).await?;
        Ok(to_envelope(&value))
    }
}
