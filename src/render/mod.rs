//! HTML fragments for the collaboration panel
//!
//! Every fragment comes from a handlebars template stored next to this file.
//! Rendering is pure: the same inputs always give the same markup, which is
//! what lets the panel overwrite a slot wholesale on every fetch.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::config::{DisplayConfig, Labels};
use crate::dialog::ConfirmRequest;
use crate::errors::{RenderError, RenderResult};
use crate::model::{CandidateUser, Collaborator, Permission, ProjectId};

const COLLABORATOR_ROW: &str = "collaborator_row";
const EMPTY_STATE: &str = "empty_state";
const LIST_ERROR: &str = "list_error";
const CANDIDATE_OPTIONS: &str = "candidate_options";
const INVITE_BUTTON: &str = "invite_button";
const CONFIRM_PROMPT: &str = "confirm_prompt";

/// Avatar gradients, picked by row position
const AVATAR_PALETTE: [(&str, &str); 8] = [
    ("#667eea", "#764ba2"),
    ("#f093fb", "#f5576c"),
    ("#4facfe", "#00f2fe"),
    ("#43e97b", "#38f9d7"),
    ("#fa709a", "#fee140"),
    ("#a8edea", "#fed6e3"),
    ("#ffecd2", "#fcb69f"),
    ("#ff8a80", "#ff5722"),
];

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarGradient {
    pub from: &'static str,
    pub to: &'static str,
}

/// Gradient for the avatar of the row at `row_index`. Stable per index,
/// repeats every eight rows.
pub fn avatar_gradient(row_index: usize) -> AvatarGradient {
    let (from, to) = AVATAR_PALETTE[row_index % AVATAR_PALETTE.len()];
    AvatarGradient { from, to }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PermissionBadge {
    pub icon: &'static str,
    pub label: String,
}

pub fn permission_badge(permission: Permission, labels: &Labels) -> PermissionBadge {
    match permission {
        Permission::Read => PermissionBadge {
            icon: "eye",
            label: labels.read.clone(),
        },
        Permission::Write => PermissionBadge {
            icon: "edit",
            label: labels.write.clone(),
        },
    }
}

/// Why the collaborator list could not be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFailure<'a> {
    /// The server answered with an error message
    Server(&'a str),
    /// The request never completed
    Unreachable,
}

pub struct Renderer {
    handlebars: Handlebars<'static>,
    labels: Labels,
    offset: FixedOffset,
    timestamp_format: String,
}

impl Renderer {
    pub fn new(labels: Labels, display: &DisplayConfig) -> RenderResult<Self> {
        if StrftimeItems::new(&display.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(RenderError::TimestampFormat(display.timestamp_format.clone()));
        }

        let mut handlebars = crate::common::get_handlebars();

        handlebars.register_template_string(COLLABORATOR_ROW, include_str!("collaborator_row.hbs"))?;
        handlebars.register_template_string(EMPTY_STATE, include_str!("empty_state.hbs"))?;
        handlebars.register_template_string(LIST_ERROR, include_str!("list_error.hbs"))?;
        handlebars.register_template_string(CANDIDATE_OPTIONS, include_str!("candidate_options.hbs"))?;
        handlebars.register_template_string(INVITE_BUTTON, include_str!("invite_button.hbs"))?;
        handlebars.register_template_string(CONFIRM_PROMPT, include_str!("confirm_prompt.hbs"))?;

        Ok(Self {
            handlebars,
            labels,
            offset: display.offset(),
            timestamp_format: display.timestamp_format.clone(),
        })
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn format_timestamp(&self, timestamp: DateTime<Utc>) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format(&self.timestamp_format)
            .to_string()
    }

    /// One collaborator row. The removal control carries `project_id` and the
    /// collaborator's user id; the permission select carries the
    /// collaboration id.
    pub fn collaborator_row(
        &self,
        project_id: ProjectId,
        collaborator: &Collaborator,
        row_index: usize,
    ) -> RenderResult<String> {
        let html = self.handlebars.render(
            COLLABORATOR_ROW,
            &json!({
                "id": collaborator.id,
                "collaborator_id": collaborator.collaborator_id,
                "project_id": project_id.get(),
                "username": collaborator.username,
                "permission": collaborator.permission.as_str(),
                "badge": permission_badge(collaborator.permission, &self.labels),
                "avatar": avatar_gradient(row_index),
                "created_at": collaborator.created_at.to_rfc3339(),
                "joined": self.format_timestamp(collaborator.created_at),
                "labels": self.labels,
            }),
        )?;
        Ok(html)
    }

    /// Full list content: the rows in order, or the empty state when there
    /// are none.
    pub fn collaborator_list(
        &self,
        project_id: ProjectId,
        collaborators: &[Collaborator],
    ) -> RenderResult<String> {
        if collaborators.is_empty() {
            return self.empty_state();
        }

        collaborators
            .iter()
            .enumerate()
            .map(|(index, collaborator)| self.collaborator_row(project_id, collaborator, index))
            .collect()
    }

    pub fn empty_state(&self) -> RenderResult<String> {
        Ok(self
            .handlebars
            .render(EMPTY_STATE, &json!({ "labels": self.labels }))?)
    }

    pub fn list_error(&self, failure: ListFailure<'_>) -> RenderResult<String> {
        let (server, message) = match failure {
            ListFailure::Server(message) => (true, message),
            ListFailure::Unreachable => (false, self.labels.load_collaborators_failed.as_str()),
        };
        Ok(self.handlebars.render(
            LIST_ERROR,
            &json!({ "server": server, "message": message }),
        )?)
    }

    /// Options for the candidate select: the placeholder first, then one
    /// entry per user.
    pub fn candidate_options(&self, users: &[CandidateUser]) -> RenderResult<String> {
        Ok(self.handlebars.render(
            CANDIDATE_OPTIONS,
            &json!({ "placeholder": self.labels.select_user, "users": users }),
        )?)
    }

    pub fn invite_button(&self, busy: bool) -> RenderResult<String> {
        let label = if busy {
            &self.labels.inviting
        } else {
            &self.labels.invite
        };
        Ok(self
            .handlebars
            .render(INVITE_BUTTON, &json!({ "busy": busy, "label": label }))?)
    }

    pub fn confirm_prompt(&self, request: &ConfirmRequest) -> RenderResult<String> {
        Ok(self.handlebars.render(
            CONFIRM_PROMPT,
            &json!({
                "title": request.title,
                "message": request.message,
                "note": request.note,
                "labels": self.labels,
            }),
        )?)
    }
}
