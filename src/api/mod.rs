//! Backend contract for the collaboration feature
//!
//! | Method | Path |
//! |---|---|
//! | GET | /api/available-collaborators |
//! | GET | /api/project/{projectId}/collaborations |
//! | POST | /api/project/{projectId}/collaborations |
//! | DELETE | /api/project/{projectId}/collaborations/{collaboratorId} |
//! | PUT | /api/project/collaborations/{collaborationId}/permission |
//! | DELETE | /api/project/{projectId}/collaboration/leave |
//! | GET | /api/collaborated-projects |

pub mod http;

use async_trait::async_trait;

use crate::errors::ApiResult;
use crate::model::{
    CandidateUser, CollaboratedProject, Collaborator, InviteRequest, MessageResponse, Permission,
    ProjectId,
};

pub use http::HttpCollaborationApi;

#[async_trait]
pub trait CollaborationApi: Send + Sync {
    /// Users that can still be invited to `project_id`
    async fn available_collaborators(&self, project_id: ProjectId)
        -> ApiResult<Vec<CandidateUser>>;

    async fn project_collaborations(&self, project_id: ProjectId) -> ApiResult<Vec<Collaborator>>;

    async fn invite_collaborator(
        &self,
        project_id: ProjectId,
        request: &InviteRequest,
    ) -> ApiResult<MessageResponse>;

    /// `collaborator_id` is the collaborator's user id
    async fn remove_collaborator(
        &self,
        project_id: ProjectId,
        collaborator_id: i64,
    ) -> ApiResult<MessageResponse>;

    /// `collaboration_id` is the id of the grant itself
    async fn update_permission(
        &self,
        collaboration_id: i64,
        permission: Permission,
    ) -> ApiResult<MessageResponse>;

    /// The current user gives up their own access to `project_id`
    async fn leave_collaboration(&self, project_id: ProjectId) -> ApiResult<MessageResponse>;

    /// Projects the current user was invited to
    async fn collaborated_projects(&self) -> ApiResult<Vec<CollaboratedProject>>;
}
