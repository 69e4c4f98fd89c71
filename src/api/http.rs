use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::CollaborationApi;
use crate::config::ApiConfig;
use crate::errors::{ApiError, ApiResult};
use crate::model::{
    CandidateUser, CollaboratedProject, Collaborator, ErrorBody, InviteRequest, MessageResponse,
    Permission, PermissionUpdate, ProjectId,
};

/// `CollaborationApi` over HTTP with JSON bodies
#[derive(Clone)]
pub struct HttpCollaborationApi {
    client: Client,
    base_url: String,
}

impl HttpCollaborationApi {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            ApiError::InvalidConfig(format!("base_url {:?}: {}", config.base_url, err))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig(format!(
                "base_url {:?} cannot be used as a base",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|err| {
                ApiError::InvalidConfig(format!("session_cookie: {}", err))
            })?;
            headers.insert(COOKIE, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<T> {
        debug!("{}", endpoint);

        let response = request.send().await.map_err(|err| {
            error!("{} failed: {}", endpoint, err);
            ApiError::Transport(err)
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|err| ApiError::Malformed {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            });
        }

        match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => {
                warn!("{} rejected ({}): {}", endpoint, status, error);
                Err(ApiError::Application {
                    status: status.as_u16(),
                    message: error,
                })
            }
            Err(err) => Err(ApiError::Malformed {
                endpoint: endpoint.to_string(),
                reason: format!("status {} without error body: {}", status, err),
            }),
        }
    }
}

#[async_trait]
impl CollaborationApi for HttpCollaborationApi {
    async fn available_collaborators(
        &self,
        project_id: ProjectId,
    ) -> ApiResult<Vec<CandidateUser>> {
        let request = self
            .client
            .get(self.url("/api/available-collaborators"))
            .query(&[("project_id", project_id.get())]);
        self.send("GET /api/available-collaborators", request).await
    }

    async fn project_collaborations(&self, project_id: ProjectId) -> ApiResult<Vec<Collaborator>> {
        let path = format!("/api/project/{}/collaborations", project_id);
        let request = self.client.get(self.url(&path));
        self.send(&format!("GET {}", path), request).await
    }

    async fn invite_collaborator(
        &self,
        project_id: ProjectId,
        invite: &InviteRequest,
    ) -> ApiResult<MessageResponse> {
        let path = format!("/api/project/{}/collaborations", project_id);
        let request = self.client.post(self.url(&path)).json(invite);
        self.send(&format!("POST {}", path), request).await
    }

    async fn remove_collaborator(
        &self,
        project_id: ProjectId,
        collaborator_id: i64,
    ) -> ApiResult<MessageResponse> {
        let path = format!(
            "/api/project/{}/collaborations/{}",
            project_id, collaborator_id
        );
        let request = self.client.delete(self.url(&path));
        self.send(&format!("DELETE {}", path), request).await
    }

    async fn update_permission(
        &self,
        collaboration_id: i64,
        permission: Permission,
    ) -> ApiResult<MessageResponse> {
        let path = format!("/api/project/collaborations/{}/permission", collaboration_id);
        let request = self
            .client
            .put(self.url(&path))
            .json(&PermissionUpdate { permission });
        self.send(&format!("PUT {}", path), request).await
    }

    async fn leave_collaboration(&self, project_id: ProjectId) -> ApiResult<MessageResponse> {
        let path = format!("/api/project/{}/collaboration/leave", project_id);
        let request = self.client.delete(self.url(&path));
        self.send(&format!("DELETE {}", path), request).await
    }

    async fn collaborated_projects(&self) -> ApiResult<Vec<CollaboratedProject>> {
        let request = self.client.get(self.url("/api/collaborated-projects"));
        self.send("GET /api/collaborated-projects", request).await
    }
}
