//! Running manifest-declared scripts through the external runner.
//!
//! The manifest is read again on every call so scripts added between calls
//! are picked up. The child runs to completion in the workspace root; a
//! non-zero exit status is reported as data, not as an error.

use crate::config::WorkspaceConfig;
use crate::encoding::{decode_lossy, output_encoding};
use crate::error::WorkspaceError;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Command;

/// Script names declared by the project manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptManifest {
    scripts: BTreeSet<String>,
}

impl ScriptManifest {
    /// Load and parse the manifest at `path`.
    pub async fn load(path: &Path) -> Result<Self, WorkspaceError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(WorkspaceError::ManifestNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8(bytes)
            .map_err(|e| WorkspaceError::ManifestInvalid(format!("not valid UTF-8: {e}")))?;
        Self::parse(&text)
    }

    /// Parse manifest JSON. A missing or null `scripts` member means no scripts.
    pub fn parse(text: &str) -> Result<Self, WorkspaceError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| WorkspaceError::ManifestInvalid(e.to_string()))?;
        let Value::Object(root) = value else {
            return Err(WorkspaceError::ManifestInvalid(
                "top level must be a JSON object".into(),
            ));
        };
        let scripts = match root.get("scripts") {
            None | Some(Value::Null) => BTreeSet::new(),
            Some(Value::Object(scripts)) => scripts.keys().cloned().collect(),
            Some(_) => {
                return Err(WorkspaceError::ManifestInvalid(
                    "`scripts` must be a JSON object".into(),
                ));
            }
        };
        Ok(Self { scripts })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains(name)
    }

    /// Declared script names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.scripts.iter().cloned().collect()
    }
}

/// Captured outcome of one script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exit_code: {}\nstdout:\n{}\nstderr:\n{}",
            self.exit_code, self.stdout, self.stderr
        )
    }
}

/// Run the manifest script `name` and capture its output.
pub async fn run_script(
    config: &WorkspaceConfig,
    name: &str,
) -> Result<ProcessResult, WorkspaceError> {
    let manifest = ScriptManifest::load(&config.root.join(&config.manifest)).await?;
    if !manifest.contains(name) {
        return Err(WorkspaceError::UnknownScript {
            script: name.to_string(),
            available: manifest.names(),
        });
    }

    let program = &config.runner.program;
    tracing::debug!(script = name, %program, "running script");
    let output = Command::new(program)
        .args(&config.runner.args)
        .args(["run", name, "--", "--no-color"])
        .current_dir(&config.root)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| WorkspaceError::Spawn {
            program: program.clone(),
            source,
        })?;

    let encoding = output_encoding(config.output_encoding.as_deref());
    let result = ProcessResult {
        exit_code: exit_code(output.status),
        stdout: decode_lossy(encoding, &output.stdout),
        stderr: decode_lossy(encoding, &output.stderr),
    };
    tracing::debug!(script = name, exit_code = result.exit_code, "script finished");
    Ok(result)
}

/// Exit code of the child, or the negated signal number if it was killed.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

#[cfg(test)]
mod tests {
    use crate::config::{RunnerConfig, WorkspaceConfig};
    use crate::error::WorkspaceError;
    use crate::script::{ProcessResult, ScriptManifest, run_script};
    use crate::validate::canonicalize_root;
    use std::fs;

    const MANIFEST: &str = r#"{
        "name": "ext",
        "scripts": { "lint": "eslint src", "build": "tsc -p ." }
    }"#;

    fn workspace() -> (tempfile::TempDir, WorkspaceConfig) {
        let tmp = tempfile::tempdir().unwrap();
        let root = canonicalize_root(tmp.path()).unwrap();
        (tmp, WorkspaceConfig::new(root))
    }

    #[test]
    fn parse_collects_sorted_names() {
        let manifest = ScriptManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.names(), vec!["build", "lint"]);
        assert!(manifest.contains("lint"));
        assert!(!manifest.contains("test"));
    }

    #[test]
    fn parse_treats_missing_scripts_as_empty() {
        assert!(ScriptManifest::parse(r#"{"name": "x"}"#).unwrap().names().is_empty());
        assert!(ScriptManifest::parse(r#"{"scripts": null}"#).unwrap().names().is_empty());
    }

    #[test]
    fn parse_rejects_malformed_manifests() {
        for text in ["{ not json", "[1, 2]", r#"{"scripts": ["lint"]}"#] {
            let result = ScriptManifest::parse(text);
            assert!(matches!(result, Err(WorkspaceError::ManifestInvalid(_))), "{text}");
        }
    }

    #[test]
    fn result_renders_as_text_block() {
        let result = ProcessResult {
            exit_code: 2,
            stdout: "out\n".into(),
            stderr: "err\n".into(),
        };
        assert_eq!(result.to_string(), "exit_code: 2\nstdout:\nout\n\nstderr:\nerr\n");
    }

    #[tokio::test]
    async fn missing_manifest_is_reported() {
        let (_tmp, config) = workspace();
        let result = run_script(&config, "lint").await;
        assert!(matches!(result, Err(WorkspaceError::ManifestNotFound(_))));
    }

    #[tokio::test]
    async fn invalid_manifest_is_reported() {
        let (_tmp, config) = workspace();
        fs::write(config.root.join("package.json"), "{ \"scripts\": ").unwrap();
        let result = run_script(&config, "lint").await;
        assert!(matches!(result, Err(WorkspaceError::ManifestInvalid(_))));
    }

    #[tokio::test]
    async fn unknown_script_lists_defined_names() {
        let (_tmp, config) = workspace();
        fs::write(config.root.join("package.json"), MANIFEST).unwrap();
        let err = run_script(&config, "test").await.unwrap_err();
        assert!(matches!(err, WorkspaceError::UnknownScript { .. }));
        assert!(err.to_string().contains("build, lint"), "{err}");
    }

    #[tokio::test]
    async fn missing_runner_is_a_spawn_error() {
        let (_tmp, mut config) = workspace();
        fs::write(config.root.join("package.json"), MANIFEST).unwrap();
        config.runner = RunnerConfig {
            program: "wmcp-no-such-runner".into(),
            args: Vec::new(),
        };
        let result = run_script(&config, "lint").await;
        assert!(matches!(result, Err(WorkspaceError::Spawn { .. })));
    }

    /// Point the runner at a shell script standing in for the package manager.
    #[cfg(unix)]
    fn fake_runner(config: &mut WorkspaceConfig, dir: &tempfile::TempDir, body: &str) {
        let script = dir.path().join("runner.sh");
        fs::write(&script, body).unwrap();
        config.runner = RunnerConfig {
            program: "sh".into(),
            args: vec![script.to_string_lossy().into_owned()],
        };
        config.output_encoding = Some("utf-8".into());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_script_in_root_and_reports_nonzero_exit() {
        let (_tmp, mut config) = workspace();
        let bin = tempfile::tempdir().unwrap();
        fs::write(config.root.join("package.json"), MANIFEST).unwrap();
        fake_runner(
            &mut config,
            &bin,
            "echo \"args: $*\"\necho \"cwd: $(pwd -P)\"\necho problem >&2\nexit 3\n",
        );

        let result = run_script(&config, "lint").await.unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(result.stdout.contains("args: run lint -- --no-color"), "{}", result.stdout);
        assert!(
            result.stdout.contains(&format!("cwd: {}", config.root.display())),
            "{}",
            result.stdout
        );
        assert_eq!(result.stderr, "problem\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn undecodable_output_is_replaced() {
        let (_tmp, mut config) = workspace();
        let bin = tempfile::tempdir().unwrap();
        fs::write(config.root.join("package.json"), MANIFEST).unwrap();
        fake_runner(&mut config, &bin, "printf 'bad \\377 byte'\n");

        let result = run_script(&config, "build").await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "bad \u{fffd} byte");
        assert_eq!(result.stderr, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn manifest_is_reread_on_every_call() {
        let (_tmp, mut config) = workspace();
        let bin = tempfile::tempdir().unwrap();
        fake_runner(&mut config, &bin, "echo ok\n");

        fs::write(config.root.join("package.json"), r#"{"scripts": {"lint": "x"}}"#).unwrap();
        let result = run_script(&config, "test").await;
        assert!(matches!(result, Err(WorkspaceError::UnknownScript { .. })));

        fs::write(
            config.root.join("package.json"),
            r#"{"scripts": {"lint": "x", "test": "y"}}"#,
        )
        .unwrap();
        let result = run_script(&config, "test").await.unwrap();
        assert_eq!(result.stdout, "ok\n");
    }
}
