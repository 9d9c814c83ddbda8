//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Used by the STDIO transport. Each registered tool becomes one dynamic route
//! delegating to `ToolRegistry::call_tool`.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};

use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .tools()
        .iter()
        .fold(ToolRouter::new(), |router, tool| {
            let name = tool.name();
            let registry = registry.clone();
            router.with_route(ToolRoute::new_dyn(
                tool.to_tool(),
                move |ctx: ToolCallContext<'_, S>| {
                    let registry = registry.clone();
                    let args = ctx.arguments.clone().unwrap_or_default();
                    async move { registry.call_tool(name, args).await.map_err(McpError::from) }
                        .boxed()
                },
            ))
        })
}
