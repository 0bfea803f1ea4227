//! Tool implementations for the workspace MCP server.

use crate::WorkspaceServer;
use crate::config::WorkspaceConfig;
use crate::error::WorkspaceError;
use crate::validate::canonicalize_root;
use crate::{files, script};
use rmcp::{
    handler::server::wrapper::Parameters,
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Parameters for reading a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// Path of the file, relative to the workspace root (e.g. "src/extension.ts").
    pub rel_path: String,
}

/// Parameters for writing a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// Path of the file, relative to the workspace root.
    pub rel_path: String,
    /// New content of the file. Replaces the existing content entirely.
    pub content: String,
}

/// Parameters for running a manifest script.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunScriptParams {
    /// Name of the script in the manifest `scripts` (e.g. "lint", "compile", "test").
    pub script: String,
}

#[tool_router]
impl WorkspaceServer {
    /// Create a new workspace server from the given configuration.
    ///
    /// Fails if the configured root does not exist or is not a directory.
    pub fn new(mut config: WorkspaceConfig) -> Result<Self, WorkspaceError> {
        config.root = canonicalize_root(&config.root)?;
        Ok(Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        })
    }

    /// List every admissible file in the workspace.
    #[tool(
        description = "List files in the workspace as paths relative to its root. Version control, dependency and tool cache directories and binary, archive or lock files are omitted"
    )]
    async fn list_workspace_files(&self) -> Result<String, String> {
        let files = files::list_files(&self.config).await;
        serde_json::to_string_pretty(&files).map_err(|e| e.to_string())
    }

    /// Read the complete text of a file.
    #[tool(
        description = "Read the complete UTF-8 text of a file, given its path relative to the workspace root. Files above the size limit and binary files are refused"
    )]
    async fn read_file(
        &self,
        Parameters(params): Parameters<ReadFileParams>,
    ) -> Result<String, String> {
        files::read_file(&self.config, &params.rel_path)
            .await
            .map_err(|e| e.to_string())
    }

    /// Overwrite a file with new content.
    #[tool(
        description = "Replace the entire content of a file (UTF-8), given its path relative to the workspace root. Missing parent directories are created"
    )]
    async fn write_file(
        &self,
        Parameters(params): Parameters<WriteFileParams>,
    ) -> Result<String, String> {
        let path = files::write_file(&self.config, &params.rel_path, &params.content)
            .await
            .map_err(|e| e.to_string())?;
        Ok(format!("Successfully wrote to {}", path.display()))
    }

    /// Run a script declared in the project manifest.
    #[tool(
        description = "Run a script declared in the package.json scripts (e.g. lint, compile, test) and return its exit code, stdout and stderr. A non-zero exit code is reported in the result, not as an error"
    )]
    async fn run_script(
        &self,
        Parameters(params): Parameters<RunScriptParams>,
    ) -> Result<String, String> {
        script::run_script(&self.config, &params.script)
            .await
            .map(|result| result.to_string())
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::WorkspaceServer;
    use crate::config::WorkspaceConfig;
    use crate::tools::{ReadFileParams, RunScriptParams, WriteFileParams};
    use rmcp::handler::server::wrapper::Parameters;
    use std::fs;

    fn server() -> (tempfile::TempDir, WorkspaceServer) {
        let tmp = tempfile::tempdir().unwrap();
        let server = WorkspaceServer::new(WorkspaceConfig::new(tmp.path())).unwrap();
        (tmp, server)
    }

    fn read(path: &str) -> Parameters<ReadFileParams> {
        Parameters(ReadFileParams {
            rel_path: path.into(),
        })
    }

    fn write(path: &str, content: &str) -> Parameters<WriteFileParams> {
        Parameters(WriteFileParams {
            rel_path: path.into(),
            content: content.into(),
        })
    }

    #[test]
    fn new_rejects_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let result = WorkspaceServer::new(WorkspaceConfig::new(tmp.path().join("missing")));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_returns_json_array() {
        let (tmp, server) = server();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("a/b.txt"), "0123456789").unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join(".git/config"), "").unwrap();

        let text = server.list_workspace_files().await.expect("should succeed");
        let files: Vec<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(files, vec!["a/b.txt"]);
    }

    #[tokio::test]
    async fn write_then_read() {
        let (_tmp, server) = server();
        let message = server
            .write_file(write("src/new/extension.ts", "const a = 1;\n"))
            .await
            .expect("should succeed");
        assert!(message.starts_with("Successfully wrote to "));
        assert!(message.contains("extension.ts"));

        let text = server
            .read_file(read("src/new/extension.ts"))
            .await
            .expect("should succeed");
        assert_eq!(text, "const a = 1;\n");
    }

    #[tokio::test]
    async fn failures_become_messages() {
        let (_tmp, server) = server();
        let err = server.read_file(read("../outside.txt")).await.unwrap_err();
        assert!(err.contains("escapes the workspace root"), "{err}");

        let err = server.read_file(read("nothing.txt")).await.unwrap_err();
        assert!(err.contains("file not found"), "{err}");
        assert!(err.contains("nothing.txt"), "{err}");

        let err = server
            .write_file(write(".venv/lib/site.py", "x"))
            .await
            .unwrap_err();
        assert!(err.contains(".venv"), "{err}");

        let err = server.read_file(read("src/\0x.ts")).await.unwrap_err();
        assert!(err.contains("null byte"), "{err}");
        let err = server.write_file(write("a\0.ts", "x")).await.unwrap_err();
        assert!(err.contains("null byte"), "{err}");
    }

    #[tokio::test]
    async fn run_script_reports_unknown_names() {
        let (tmp, server) = server();
        fs::write(
            tmp.path().join("package.json"),
            r#"{"scripts": {"lint": "eslint", "build": "tsc"}}"#,
        )
        .unwrap();
        let err = server
            .run_script(Parameters(RunScriptParams {
                script: "test".into(),
            }))
            .await
            .unwrap_err();
        assert!(err.contains("build, lint"), "{err}");
    }
}
