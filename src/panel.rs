//! The collaboration panel of a project page
//!
//! Every operation follows the same shape: call the backend, render the
//! answer into the surface, and surface failures through the notifier. The
//! panel never patches what it rendered; a successful mutation ends by
//! re-fetching the lists it may have affected, and a permission change
//! re-fetches whatever its result.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::api::CollaborationApi;
use crate::dialog::{ConfirmDialog, ConfirmRequest};
use crate::errors::{ApiError, RenderError, RenderResult};
use crate::model::{CandidateUser, Collaborator, InviteRequest, Permission, ProjectId};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::render::{ListFailure, Renderer};
use crate::surface::{PanelSurface, Slot};

/// How an operation ended, after any failure has already been shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Carries the message that was shown to the user
    Failure(String),
    /// The user declined a confirmation; nothing was sent
    Cancelled,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Which read queries a completed mutation invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    Collaborators,
    Candidates,
    Both,
}

impl Invalidation {
    fn collaborators(&self) -> bool {
        matches!(self, Invalidation::Collaborators | Invalidation::Both)
    }

    fn candidates(&self) -> bool {
        matches!(self, Invalidation::Candidates | Invalidation::Both)
    }
}

pub struct CollaborationPanel {
    project_id: ProjectId,
    api: Arc<dyn CollaborationApi>,
    surface: Arc<dyn PanelSurface>,
    notifier: Arc<dyn Notifier>,
    confirmation: Option<Arc<dyn ConfirmDialog>>,
    renderer: Renderer,
    /// Users the candidate select currently offers
    offered: RwLock<Vec<CandidateUser>>,
}

impl CollaborationPanel {
    pub fn new(
        project_id: ProjectId,
        api: Arc<dyn CollaborationApi>,
        surface: Arc<dyn PanelSurface>,
        renderer: Renderer,
    ) -> Self {
        Self {
            project_id,
            api,
            surface,
            notifier: Arc::new(TracingNotifier),
            confirmation: None,
            renderer,
            offered: RwLock::new(Vec::new()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Ask `dialog` before every removal
    pub fn with_confirmation(mut self, dialog: Arc<dyn ConfirmDialog>) -> Self {
        self.confirmation = Some(dialog);
        self
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub async fn offered_candidates(&self) -> Vec<CandidateUser> {
        self.offered.read().await.clone()
    }

    /// Initial page load
    pub async fn load(&self) {
        self.refresh(Invalidation::Both).await;
    }

    pub async fn refresh(&self, invalidation: Invalidation) {
        self.refresh_project(self.project_id, invalidation).await;
    }

    async fn refresh_project(&self, project_id: ProjectId, invalidation: Invalidation) {
        if invalidation.collaborators() {
            self.fetch_collaborators(project_id).await;
        }
        if invalidation.candidates() {
            self.fetch_candidate_users().await;
        }
    }

    /// Replaces the candidate select's options. On failure the select keeps
    /// whatever it offered before.
    pub async fn fetch_candidate_users(&self) -> Outcome {
        let users = match self.api.available_collaborators(self.project_id).await {
            Ok(users) => users,
            Err(err) => {
                log_api_failure("load candidate users", self.project_id, &err);
                let message = err.user_message(&self.renderer.labels().load_users_failed);
                return self.fail(message.to_string()).await;
            }
        };

        let html = match self.renderer.candidate_options(&users) {
            Ok(html) => html,
            Err(err) => return self.render_failed(err).await,
        };
        self.surface.replace_html(Slot::CandidateSelect, html);
        *self.offered.write().await = users;

        Outcome::Success
    }

    /// Replaces the collaborator list and count. On failure an inline error
    /// takes the list's place and the count is left alone.
    pub async fn fetch_collaborators(&self, project_id: ProjectId) -> Outcome {
        let collaborators = match self.api.project_collaborations(project_id).await {
            Ok(collaborators) => collaborators,
            Err(err) => {
                log_api_failure("load collaborators", project_id, &err);
                let failure = match err.server_message() {
                    Some(message) => ListFailure::Server(message),
                    None => ListFailure::Unreachable,
                };
                let html = match self.renderer.list_error(failure) {
                    Ok(html) => html,
                    Err(render_err) => return self.render_failed(render_err).await,
                };
                self.surface.replace_html(Slot::CollaboratorList, html);

                let labels = self.renderer.labels();
                return Outcome::Failure(err.user_message(&labels.load_collaborators_failed).to_string());
            }
        };

        let html = match self.renderer.collaborator_list(project_id, &collaborators) {
            Ok(html) => html,
            Err(err) => return self.render_failed(err).await,
        };
        self.surface
            .set_text(Slot::CollaboratorCount, collaborators.len().to_string());
        self.surface.replace_html(Slot::CollaboratorList, html);

        Outcome::Success
    }

    /// Pure: one row of the list for this panel's project
    pub fn render_collaborator_row(
        &self,
        collaborator: &Collaborator,
        row_index: usize,
    ) -> RenderResult<String> {
        self.renderer
            .collaborator_row(self.project_id, collaborator, row_index)
    }

    pub async fn submit_invite(&self, candidate_user_id: i64, permission: Permission) -> Outcome {
        let offered = self
            .offered
            .read()
            .await
            .iter()
            .any(|user| user.id == candidate_user_id);
        if !offered {
            warn!(
                "User {} is not offered for project {}",
                candidate_user_id, self.project_id
            );
            let message = self.renderer.labels().candidate_not_offered.clone();
            return self.fail(message).await;
        }

        let request = InviteRequest {
            collaborator_id: candidate_user_id,
            permission,
        };

        self.set_invite_busy(true);
        let result = self.api.invite_collaborator(self.project_id, &request).await;
        self.set_invite_busy(false);

        match result {
            Ok(response) => {
                info!(
                    "Invited user {} to project {} with {} permission",
                    candidate_user_id, self.project_id, permission
                );
                self.succeed(response.message).await;
                self.refresh(Invalidation::Both).await;
                self.surface.reset(Slot::InviteForm);
                Outcome::Success
            }
            Err(err) => {
                log_api_failure("invite collaborator", self.project_id, &err);
                let message = err.user_message(&self.renderer.labels().invite_failed);
                self.fail(message.to_string()).await
            }
        }
    }

    pub async fn remove_collaboration(
        &self,
        project_id: ProjectId,
        collaborator_user_id: i64,
    ) -> Outcome {
        if let Some(dialog) = &self.confirmation {
            let request = ConfirmRequest::removal(self.renderer.labels());
            match self.renderer.confirm_prompt(&request) {
                Ok(html) => self.surface.replace_html(Slot::ConfirmModal, html),
                Err(err) => warn!("Failed to render confirmation prompt: {}", err),
            }
            if !dialog.confirm(request).await {
                info!(
                    "Removal of user {} from project {} cancelled",
                    collaborator_user_id, project_id
                );
                return Outcome::Cancelled;
            }
        }

        match self
            .api
            .remove_collaborator(project_id, collaborator_user_id)
            .await
        {
            Ok(response) => {
                info!(
                    "Removed user {} from project {}",
                    collaborator_user_id, project_id
                );
                self.succeed(response.message).await;
                self.refresh_project(project_id, Invalidation::Both).await;
                Outcome::Success
            }
            Err(err) => {
                log_api_failure("remove collaborator", project_id, &err);
                let message = err.user_message(&self.renderer.labels().remove_failed);
                self.fail(message.to_string()).await
            }
        }
    }

    /// The permission select has already moved to `new_permission` when this
    /// runs; the re-fetch afterwards puts it back if the server refused.
    pub async fn change_permission(&self, collaboration_id: i64, new_permission: Permission) -> Outcome {
        let outcome = match self
            .api
            .update_permission(collaboration_id, new_permission)
            .await
        {
            Ok(response) => {
                info!(
                    "Collaboration {} now has {} permission",
                    collaboration_id, new_permission
                );
                self.succeed(response.message).await;
                Outcome::Success
            }
            Err(err) => {
                log_api_failure("update permission", self.project_id, &err);
                let message = err.user_message(&self.renderer.labels().permission_failed);
                self.fail(message.to_string()).await
            }
        };

        self.refresh(Invalidation::Collaborators).await;
        outcome
    }

    /// The signed-in user gives up their own access to the bound project.
    /// Nothing is re-fetched: the panel is no longer theirs to show.
    pub async fn leave_project(&self) -> Outcome {
        match self.api.leave_collaboration(self.project_id).await {
            Ok(response) => {
                info!("Left project {}", self.project_id);
                self.succeed(response.message).await;
                Outcome::Success
            }
            Err(err) => {
                log_api_failure("leave", self.project_id, &err);
                let message = err.user_message(&self.renderer.labels().leave_failed);
                self.fail(message.to_string()).await
            }
        }
    }

    fn set_invite_busy(&self, busy: bool) {
        self.surface.set_disabled(Slot::InviteButton, busy);
        match self.renderer.invite_button(busy) {
            Ok(html) => self.surface.replace_html(Slot::InviteButton, html),
            Err(err) => warn!("Failed to render invite button: {}", err),
        }
    }

    async fn succeed(&self, message: String) {
        let title = self.renderer.labels().success_title.clone();
        self.notifier
            .notify(Notification::success(title, message))
            .await;
    }

    async fn fail(&self, message: String) -> Outcome {
        let title = self.renderer.labels().error_title.clone();
        self.notifier
            .notify(Notification::error(title, message.clone()))
            .await;
        Outcome::Failure(message)
    }

    async fn render_failed(&self, err: RenderError) -> Outcome {
        error!("Rendering failed: {}", err);
        let message = self.renderer.labels().render_failed.clone();
        self.fail(message).await
    }
}

fn log_api_failure(action: &str, project_id: ProjectId, err: &ApiError) {
    if err.is_application_error() {
        warn!("Failed to {} for project {}: {}", action, project_id, err);
    } else {
        error!("Failed to {} for project {}: {:?}", action, project_id, err);
    }
}
