//! Commands run around the server under test.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use blackbox_application::FixtureError;

/// External command with arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommand {
    /// Program to execute.
    pub program: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
}

impl HookCommand {
    /// Creates a command.
    #[must_use]
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs the command to completion.
    ///
    /// Returns the combined stderr as the error message when the command
    /// exits with a non-zero status.
    pub(crate) async fn run(&self) -> Result<(), String> {
        debug!(program = %self.program, args = ?self.args, "running hook");
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| format!("{}: {e}", self.program))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

/// How backing state is restored before each suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResetHook {
    /// State is not reset. Suites then see each other's writes.
    None,
    /// Run a command that must exit successfully.
    Command(HookCommand),
    /// Delete everything inside a data directory and leave it empty.
    ClearDirectory {
        /// Directory holding the server's persisted state.
        path: PathBuf,
    },
}

impl ResetHook {
    /// Executes the hook.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Reset`] if the command fails or the directory
    /// cannot be cleared.
    pub async fn run(&self) -> Result<(), FixtureError> {
        match self {
            Self::None => {
                warn!("reset hook is `none`; state is not reset between suites");
                Ok(())
            }
            Self::Command(command) => command.run().await.map_err(FixtureError::Reset),
            Self::ClearDirectory { path } => {
                debug!(path = %path.display(), "clearing state directory");
                match tokio::fs::remove_dir_all(path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(FixtureError::Reset(format!("{}: {e}", path.display())));
                    }
                }
                tokio::fs::create_dir_all(path)
                    .await
                    .map_err(|e| FixtureError::Reset(format!("{}: {e}", path.display())))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn clear_directory_leaves_it_empty() {
        let temp = tempdir().unwrap();
        let data = temp.path().join("datastore");
        std::fs::create_dir_all(data.join("nested")).unwrap();
        std::fs::write(data.join("mainnet.db"), b"rows").unwrap();
        std::fs::write(data.join("nested").join("blob"), b"x").unwrap();

        ResetHook::ClearDirectory { path: data.clone() }.run().await.unwrap();

        assert!(data.is_dir());
        assert_eq!(std::fs::read_dir(&data).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn clear_directory_creates_missing_directory() {
        let temp = tempdir().unwrap();
        let data = temp.path().join("fresh");

        ResetHook::ClearDirectory { path: data.clone() }.run().await.unwrap();
        assert!(data.is_dir());
    }

    #[tokio::test]
    async fn missing_program_is_a_reset_error() {
        let hook = ResetHook::Command(HookCommand::new(
            "blackbox-definitely-not-installed",
            Vec::<String>::new(),
        ));
        assert!(matches!(hook.run().await, Err(FixtureError::Reset(_))));
    }

    #[tokio::test]
    async fn none_leaves_state_untouched() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("mainnet.db"), b"rows").unwrap();

        ResetHook::None.run().await.unwrap();
        assert!(temp.path().join("mainnet.db").exists());
    }

    #[test]
    fn deserializes_tagged_hooks() {
        let hook: ResetHook =
            serde_json::from_str(r#"{"kind": "command", "program": "make", "args": ["reset-db"]}"#)
                .unwrap();
        assert_eq!(hook, ResetHook::Command(HookCommand::new("make", ["reset-db"])));

        let hook: ResetHook =
            serde_json::from_str(r#"{"kind": "clear_directory", "path": "/tmp/ob"}"#).unwrap();
        assert_eq!(
            hook,
            ResetHook::ClearDirectory {
                path: PathBuf::from("/tmp/ob")
            }
        );

        let hook: ResetHook = serde_json::from_str(r#"{"kind": "none"}"#).unwrap();
        assert_eq!(hook, ResetHook::None);
        assert!(serde_json::from_str::<ResetHook>("{}").is_err());
    }
}
