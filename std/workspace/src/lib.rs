//! MCP server exposing a sandboxed project workspace to an agent.
//!
//! Implements four tools:
//! - `list_workspace_files`: list files relative to the workspace root
//! - `read_file`: read a UTF-8 text file, size bounded
//! - `write_file`: replace a file's content, creating parent directories
//! - `run_script`: run a `package.json` script and capture its output
//!
//! Every path is resolved against a single workspace root and rejected if it
//! escapes it or falls under the exclusion policy.

use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::Arc;

pub mod classify;
pub mod config;
pub mod encoding;
pub mod error;
pub mod files;
pub mod script;
pub mod tools;
pub mod validate;

pub use config::WorkspaceConfig;
pub use error::WorkspaceError;

/// MCP workspace server bound to one workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceServer {
    pub(crate) config: Arc<WorkspaceConfig>,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl WorkspaceServer {
    /// The canonical workspace root.
    pub fn root(&self) -> &std::path::Path {
        &self.config.root
    }
}

#[tool_handler]
impl ServerHandler for WorkspaceServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "wmcp-workspace".into(),
                title: Some("Walrus MCP Workspace Server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Workspace server for a single project: list, read and overwrite files under \
                 the workspace root, and run package.json scripts to check changes."
                    .into(),
            ),
        }
    }
}
