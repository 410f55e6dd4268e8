use anyhow::{Context, Result};
use lectern_context::project::Project;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Outcome of one build attempt. Failures are data, not errors: the watch
/// loop logs them and keeps going.
#[derive(Debug)]
pub(crate) enum BuildOutcome {
    Success,
    Failed(String),
}

/// Runs the project's build command as a child process with piped output,
/// the project root as working directory, and the exit status as the only
/// signal consulted.
#[derive(Debug)]
pub(crate) struct BuildRunner {
    program: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
}

impl BuildRunner {
    /// Use `build_config.build_command` when the manifest sets one, otherwise
    /// re-invoke this executable with the `build` subcommand.
    pub fn from_project(project: &Project) -> Result<Self> {
        if let Some(command) = &project.manifest.build_config.build_command {
            let mut parts = command.split_whitespace().map(String::from);
            if let Some(program) = parts.next() {
                return Ok(Self {
                    program: PathBuf::from(program),
                    args: parts.collect(),
                    cwd: project.root.clone(),
                });
            }
        }

        let exe =
            std::env::current_exe().context("Failed to resolve the lectern executable")?;
        Ok(Self {
            program: exe,
            args: vec!["build".into()],
            cwd: project.root.clone(),
        })
    }

    pub async fn run(&self) -> BuildOutcome {
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => BuildOutcome::Success,
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    BuildOutcome::Failed(format!("build command exited with {}", out.status))
                } else {
                    BuildOutcome::Failed(stderr.to_string())
                }
            }
            Err(e) => BuildOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_context::config::{BuildConfig, Manifest, ProjectInfo};

    fn runner(program: &str, args: &[&str]) -> BuildRunner {
        BuildRunner {
            program: PathBuf::from(program),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: std::env::temp_dir(),
        }
    }

    fn project_with_command(build_command: Option<&str>) -> Project {
        Project {
            root: PathBuf::from("/tmp/demo"),
            manifest: Manifest {
                project: ProjectInfo {
                    title: "Demo".into(),
                    lang: "en".into(),
                },
                sections: vec![],
                build_config: BuildConfig {
                    output_filename: "demo.html".into(),
                    standalone_filename: None,
                    stylesheet: "css/style.css".into(),
                    build_command: build_command.map(String::from),
                },
            },
        }
    }

    #[test]
    fn test_configured_command_is_split_on_whitespace() {
        let runner =
            BuildRunner::from_project(&project_with_command(Some("make site FAST=1"))).unwrap();
        assert_eq!(runner.program, PathBuf::from("make"));
        assert_eq!(runner.args, vec!["site", "FAST=1"]);
        assert_eq!(runner.cwd, PathBuf::from("/tmp/demo"));
    }

    #[test]
    fn test_blank_command_falls_back_to_own_build() {
        let runner = BuildRunner::from_project(&project_with_command(Some("   "))).unwrap();
        assert_eq!(runner.args, vec!["build"]);
    }

    #[test]
    fn test_default_command_is_own_build_subcommand() {
        let runner = BuildRunner::from_project(&project_with_command(None)).unwrap();
        assert_eq!(runner.args, vec!["build"]);
        assert_eq!(runner.cwd, PathBuf::from("/tmp/demo"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_command() {
        assert!(matches!(runner("true", &[]).run().await, BuildOutcome::Success));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let failing = runner("sh", &["-c", "echo boom >&2; exit 1"]);
        match failing.run().await {
            BuildOutcome::Failed(message) => assert!(message.contains("boom")),
            BuildOutcome::Success => panic!("expected a failure outcome"),
        }
        // The runner stays usable for the next change event.
        assert!(matches!(
            runner("true", &[]).run().await,
            BuildOutcome::Success
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_without_stderr_reports_status() {
        let failing = runner("sh", &["-c", "exit 3"]);
        match failing.run().await {
            BuildOutcome::Failed(message) => assert!(message.contains("exit")),
            BuildOutcome::Success => panic!("expected a failure outcome"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_reports_spawn_error() {
        let outcome = runner("lectern-does-not-exist-anywhere", &[]).run().await;
        assert!(matches!(outcome, BuildOutcome::Failed(_)));
    }
}
