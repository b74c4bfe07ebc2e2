pub mod error;
pub mod notify;
pub mod processor;
pub mod runner;
pub mod settings;
pub mod signature;

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::DeployError;
use crate::notify::Notifier;

/// Configuration for a single deployable project.
#[derive(Deserialize, Clone)]
pub struct ProjectConfig {
    pub name: String,
    pub directory: String,
    pub secret_token: String,
    pub target_branch: String,
    pub commands: Vec<Vec<String>>,
    #[serde(default)]
    pub notifications: HashMap<String, String>,
}

impl ProjectConfig {
    /// Semantic checks serde cannot express. Run per request so one broken
    /// entry only takes down its own project.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.commands.is_empty() {
            return Err(DeployError::InvalidConfig(format!(
                "project '{}': at least one command must be specified",
                self.name
            )));
        }
        for (idx, command) in self.commands.iter().enumerate() {
            if command.first().is_none_or(|token| token.is_empty()) {
                return Err(DeployError::InvalidConfig(format!(
                    "project '{}': command {} has no executable",
                    self.name, idx
                )));
            }
        }
        if !Path::new(&self.directory).is_dir() {
            return Err(DeployError::InvalidConfig(format!(
                "project '{}': directory '{}' does not exist",
                self.name, self.directory
            )));
        }
        Ok(())
    }
}

// The secret must never end up in logs, so Debug is written by hand.
impl fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("name", &self.name)
            .field("directory", &self.directory)
            .field("secret_token", &"<redacted>")
            .field("target_branch", &self.target_branch)
            .field("commands", &self.commands)
            .field("notifications", &self.notifications)
            .finish()
    }
}

/// Immutable per-project configuration, keyed by the project identifier
/// that appears in the webhook URL. Loaded once at startup.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct ProjectRegistry {
    projects: HashMap<String, ProjectConfig>,
}

impl ProjectRegistry {
    pub fn get(&self, project_name: &str) -> Option<&ProjectConfig> {
        self.projects.get(project_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.projects.keys()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

pub struct AppState {
    pub registry: ProjectRegistry,
    pub config_path: String,
    pub notifier: Notifier,
    deploy_locks: HashMap<String, Mutex<()>>,
}

impl AppState {
    pub fn new(registry: ProjectRegistry, config_path: String, notifier: Notifier) -> Self {
        // One lock per project: concurrent pushes for the same project
        // queue, different projects deploy in parallel.
        let deploy_locks = registry
            .names()
            .map(|name| (name.clone(), Mutex::new(())))
            .collect();
        Self {
            registry,
            config_path,
            notifier,
            deploy_locks,
        }
    }

    pub fn deploy_lock(&self, project_name: &str) -> Option<&Mutex<()>> {
        self.deploy_locks.get(project_name)
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project(directory: &str) -> ProjectConfig {
        serde_json::from_value(serde_json::json!({
            "name": "demo",
            "directory": directory,
            "secret_token": "s3cr3t",
            "target_branch": "refs/heads/main",
            "commands": [["echo", "hi"]],
        }))
        .unwrap()
    }

    #[test]
    fn registry_parses_json_mapping() {
        let registry: ProjectRegistry = serde_json::from_str(
            r#"{
                "demo": {
                    "name": "demo",
                    "directory": "/tmp",
                    "secret_token": "s3cr3t",
                    "target_branch": "refs/heads/main",
                    "commands": [["echo", "hi"]],
                    "notifications": {"email": "ops@example.com"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
        let project = registry.get("demo").unwrap();
        assert_eq!(project.target_branch, "refs/heads/main");
        assert_eq!(project.commands, vec![vec!["echo", "hi"]]);
        assert_eq!(
            project.notifications.get("email").map(String::as_str),
            Some("ops@example.com")
        );
    }

    #[test]
    fn notifications_default_to_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let project = sample_project(dir.path().to_str().unwrap());
        assert!(project.notifications.is_empty());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_command_list() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut project = sample_project(dir.path().to_str().unwrap());
        project.commands.clear();
        assert!(matches!(
            project.validate(),
            Err(DeployError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_command_without_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut project = sample_project(dir.path().to_str().unwrap());
        project.commands.push(vec![]);
        assert!(matches!(
            project.validate(),
            Err(DeployError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_missing_directory() {
        let project = sample_project("/definitely/not/a/real/path");
        assert!(matches!(
            project.validate(),
            Err(DeployError::InvalidConfig(_))
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let project = sample_project("/tmp");
        let rendered = format!("{:?}", project);
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("<redacted>"));
    }
}
