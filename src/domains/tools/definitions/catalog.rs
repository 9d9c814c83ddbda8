//! LENS tool catalog.
//!
//! One record per tool, in the order they are advertised to clients.

use super::proxy::ProxyTool;

/// All tools exposed by the server.
pub const LENS_TOOLS: [ProxyTool; 8] = [
    ProxyTool::listing("get-client-list", "Get list of client from LENS", "client"),
    ProxyTool::per_account(
        "get-announcements-by-account",
        "Get announcements for a given account",
        "announcements",
    ),
    ProxyTool::per_account(
        "get-ey-activities-by-account",
        "Get EY activities histogram for a given account",
        "eyactivitieshistogram",
    ),
    ProxyTool::per_account(
        "get-forecast-by-account",
        "Get forecast for a given account",
        "forecast",
    ),
    ProxyTool::per_account(
        "get-impact-by-account",
        "Get impact for a given account",
        "impact",
    ),
    ProxyTool::per_account(
        "get-meeting-activity-by-account",
        "Get meeting activity histogram for a given account",
        "meetingactivityhistogram",
    ),
    ProxyTool::per_account(
        "get-pipeline-details-by-account",
        "Get pipeline details for a given account",
        "pipelineDetails",
    ),
    ProxyTool::per_account(
        "get-top-insights-by-account",
        "Get top insights for a given account",
        "topinsights",
    ),
];
