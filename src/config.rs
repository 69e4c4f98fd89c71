use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::model::ProjectId;

/// ## Structure
/// Configuration file for the panel, YAML.
///
/// ```text
/// PanelConfig
///   ├── project_id: Option<i64>
///   ├── confirm_removal: bool
///   ├── api: ApiConfig
///   │   ├── base_url
///   │   ├── session_cookie
///   │   └── user_agent
///   ├── display: DisplayConfig
///   │   ├── utc_offset_minutes
///   │   └── timestamp_format
///   └── labels: Labels
/// ```
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PanelConfig {
    pub project_id: Option<i64>,
    /// Ask before removing a collaborator
    pub confirm_removal: bool,
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub labels: Labels,
}

impl PanelConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(content).context("Invalid panel configuration")?;
        Ok(config)
    }

    pub fn project_id(&self) -> Result<ProjectId> {
        let id = self
            .project_id
            .context("No project id configured; pass --project or set project_id")?;
        Ok(ProjectId::new(id)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Raw `Cookie` header value carrying the backend session
    pub session_cookie: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            session_cookie: None,
            user_agent: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset applied to timestamps before they are shown
    pub utc_offset_minutes: i32,
    /// chrono format string
    pub timestamp_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            timestamp_format: "%Y/%m/%d %H:%M".to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn offset(&self) -> FixedOffset {
        match self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
        {
            Some(offset) => offset,
            None => {
                warn!(
                    "Ignoring out of range utc_offset_minutes {}, using UTC",
                    self.utc_offset_minutes
                );
                Utc.fix()
            }
        }
    }
}

/// User visible strings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Labels {
    pub success_title: String,
    pub error_title: String,
    pub select_user: String,
    pub read: String,
    pub write: String,
    pub joined_at: String,
    pub change_permission: String,
    pub remove: String,
    pub empty_title: String,
    pub empty_hint: String,
    pub invite: String,
    pub inviting: String,
    pub load_users_failed: String,
    pub load_collaborators_failed: String,
    pub invite_failed: String,
    pub remove_failed: String,
    pub permission_failed: String,
    pub leave_failed: String,
    pub render_failed: String,
    pub candidate_not_offered: String,
    pub confirm_remove_title: String,
    pub confirm_remove_message: String,
    pub confirm_remove_note: String,
    pub confirm: String,
    pub cancel: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            success_title: "Success".to_string(),
            error_title: "Error".to_string(),
            select_user: "Select a user".to_string(),
            read: "Read only".to_string(),
            write: "Read & write".to_string(),
            joined_at: "Joined:".to_string(),
            change_permission: "Change permission".to_string(),
            remove: "Remove collaborator".to_string(),
            empty_title: "No collaborators yet".to_string(),
            empty_hint: "Add collaborators to share this project with your team.".to_string(),
            invite: "Invite".to_string(),
            inviting: "Inviting...".to_string(),
            load_users_failed: "Failed to load users".to_string(),
            load_collaborators_failed: "Failed to load collaborators".to_string(),
            invite_failed: "Failed to add collaborator".to_string(),
            remove_failed: "Failed to remove collaborator".to_string(),
            permission_failed: "Failed to update permission".to_string(),
            leave_failed: "Failed to leave project".to_string(),
            render_failed: "Failed to render collaborators".to_string(),
            candidate_not_offered: "The selected user cannot be invited".to_string(),
            confirm_remove_title: "Remove collaborator".to_string(),
            confirm_remove_message: "Remove this collaborator?".to_string(),
            confirm_remove_note: "They will no longer be able to access the project.".to_string(),
            confirm: "Confirm".to_string(),
            cancel: "Cancel".to_string(),
        }
    }
}
