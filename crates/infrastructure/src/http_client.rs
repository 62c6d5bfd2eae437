use crate::api::{Endpoint, StudyConnectApi};
use async_trait::async_trait;
use domain::{
    CreateGroupRequest, Group, GroupId, Task, TaskId, TaskRequest, UpdateGroupRequest, User,
    UserCreateRequest, UserId, UserUpdateRequest,
};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::{AppError, AuthService, Config, ToastRequest, ToastService};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 401 応答時に表示する通知
pub const UNAUTHORIZED_TOAST_MESSAGE: &str = "You are not allowed to access this resource";

/// reqwest による REST API クライアント
///
/// API 宛てのリクエストには認証済みならベアラートークンを付与する
/// （登録エンドポイントを除く）。401 はトーストで通知し、ログアウトはしない。
pub struct HttpApiClient {
    client: reqwest::Client,
    api_url: Url,
    register_user_endpoint: String,
    auth: AuthService,
    toasts: ToastService,
}

impl HttpApiClient {
    pub fn new(config: &Config, auth: AuthService, toasts: ToastService) -> Result<Self, AppError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| AppError::Configuration(format!("API_URL is not a valid URL: {e}")))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            client,
            api_url,
            register_user_endpoint: config.register_user_endpoint.clone(),
            auth,
            toasts,
        })
    }

    /// エンドポイントの完全なURLを組み立てる
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url, AppError> {
        if endpoint.is_public() {
            return Url::parse(&self.register_user_endpoint).map_err(|e| {
                AppError::Configuration(format!("REGISTER_USER_ENDPOINT is not a valid URL: {e}"))
            });
        }

        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Configuration("API_URL cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        let query = endpoint.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn bearer_token(&self, url: &Url) -> Option<String> {
        if !should_attach_token(url.as_str(), self.api_url.as_str(), &self.register_user_endpoint)
        {
            return None;
        }
        if !self.auth.is_authenticated() {
            return None;
        }
        self.auth.token()
    }

    async fn send(&self, endpoint: Endpoint, body: Option<Value>) -> Result<String, AppError> {
        let url = self.url_for(&endpoint)?;
        let request_id = Uuid::new_v4();
        let method = endpoint.method();
        let started = Instant::now();

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header("X-Request-Id", request_id.to_string());
        if let Some(token) = self.bearer_token(&url) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!(
            request_id = %request_id,
            method = %method,
            path = %endpoint.path(),
            "APIリクエスト送信"
        );

        let response = request.send().await.map_err(|e| {
            error!(
                request_id = %request_id,
                operation = endpoint.name(),
                "APIリクエスト失敗: {}",
                e
            );
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status.is_success() {
            info!(
                request_id = %request_id,
                method = %method,
                path = %endpoint.path(),
                status = status.as_u16(),
                elapsed_ms,
                "APIリクエスト完了"
            );
            return Ok(text);
        }

        warn!(
            request_id = %request_id,
            method = %method,
            path = %endpoint.path(),
            status = status.as_u16(),
            elapsed_ms,
            "APIエラー応答"
        );
        if status == StatusCode::UNAUTHORIZED {
            self.toasts
                .add_toast(ToastRequest::error(UNAUTHORIZED_TOAST_MESSAGE));
        }
        Err(AppError::from_status(status.as_u16(), &text))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<T, AppError> {
        let text = self.send(endpoint, body).await?;
        serde_json::from_str(&text).map_err(|e| AppError::Deserialization(e.to_string()))
    }

    async fn send_empty(&self, endpoint: Endpoint, body: Option<Value>) -> Result<(), AppError> {
        self.send(endpoint, body).await.map(|_| ())
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<Option<Value>, AppError> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| AppError::Serialization(e.to_string()))
}

/// ベアラートークンを付与すべきURLか
/// API配下で、かつ登録エンドポイントでないもの
pub fn should_attach_token(url: &str, api_url: &str, register_user_endpoint: &str) -> bool {
    let trimmed = url.trim_end_matches('/');
    if trimmed == register_user_endpoint.trim_end_matches('/') {
        return false;
    }
    trimmed.starts_with(api_url.trim_end_matches('/'))
}

#[async_trait]
impl StudyConnectApi for HttpApiClient {
    async fn list_public_groups(&self) -> Result<Vec<Group>, AppError> {
        self.send_json(Endpoint::PublicGroups, None).await
    }

    async fn search_groups(&self, query: &str) -> Result<Vec<Group>, AppError> {
        self.send_json(
            Endpoint::SearchGroups {
                query: query.to_string(),
            },
            None,
        )
        .await
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> Result<Group, AppError> {
        self.send_json(Endpoint::CreateGroup, to_body(request)?).await
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Group, AppError> {
        self.send_json(Endpoint::Group(group_id), None).await
    }

    async fn update_group(
        &self,
        group_id: GroupId,
        request: &UpdateGroupRequest,
    ) -> Result<Group, AppError> {
        self.send_json(Endpoint::UpdateGroup(group_id), to_body(request)?)
            .await
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<(), AppError> {
        self.send_empty(Endpoint::DeleteGroup(group_id), None).await
    }

    async fn group_members(&self, group_id: GroupId) -> Result<Vec<User>, AppError> {
        self.send_json(Endpoint::GroupMembers(group_id), None).await
    }

    async fn group_admins(&self, group_id: GroupId) -> Result<Vec<User>, AppError> {
        self.send_json(Endpoint::GroupAdmins(group_id), None).await
    }

    async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        self.send_empty(Endpoint::RemoveMember(group_id, user_id), None)
            .await
    }

    async fn remove_admin(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        self.send_empty(Endpoint::RemoveAdmin(group_id, user_id), None)
            .await
    }

    async fn join_group(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        self.send_empty(Endpoint::JoinGroup(group_id, user_id), None)
            .await
    }

    async fn join_by_invite_code(&self, code: &str, user_id: UserId) -> Result<(), AppError> {
        self.send_empty(
            Endpoint::JoinByInviteCode {
                code: code.to_string(),
                user_id,
            },
            None,
        )
        .await
    }

    async fn groups_for_user(&self, user_id: UserId) -> Result<Vec<Group>, AppError> {
        self.send_json(Endpoint::Membership(user_id), None).await
    }

    async fn tasks_for_group(&self, group_id: GroupId) -> Result<Vec<Task>, AppError> {
        self.send_json(Endpoint::GroupTasks(group_id), None).await
    }

    async fn create_task(
        &self,
        group_id: GroupId,
        request: &TaskRequest,
    ) -> Result<Task, AppError> {
        self.send_json(Endpoint::CreateTask(group_id), to_body(request)?)
            .await
    }

    async fn update_task(&self, task_id: TaskId, request: &TaskRequest) -> Result<Task, AppError> {
        self.send_json(Endpoint::UpdateTask(task_id), to_body(request)?)
            .await
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<(), AppError> {
        self.send_empty(Endpoint::DeleteTask(task_id), None).await
    }

    async fn tasks_for_user(&self, user_id: UserId) -> Result<Vec<Task>, AppError> {
        self.send_json(Endpoint::UserTasks(user_id), None).await
    }

    async fn create_user(&self, request: &UserCreateRequest) -> Result<User, AppError> {
        self.send_json(Endpoint::CreateUser, to_body(request)?).await
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.send_json(Endpoint::Users, None).await
    }

    async fn current_user(&self) -> Result<User, AppError> {
        self.send_json(Endpoint::CurrentUser, None).await
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, AppError> {
        self.send_json(Endpoint::User(user_id), None).await
    }

    async fn update_user(
        &self,
        user_id: UserId,
        request: &UserUpdateRequest,
    ) -> Result<User, AppError> {
        self.send_json(Endpoint::UpdateUser(user_id), to_body(request)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::StaticTokenProvider;
    use std::sync::Arc;

    fn client(config: &Config) -> HttpApiClient {
        let auth = AuthService::new(Arc::new(StaticTokenProvider::anonymous()), config.clone());
        HttpApiClient::new(config, auth, ToastService::new()).unwrap()
    }

    #[test]
    fn test_token_only_for_api_urls() {
        let api = "http://localhost:8080/api";
        let register = "http://localhost:8080/api/users";

        assert!(should_attach_token(
            "http://localhost:8080/api/groups/4",
            api,
            register
        ));
        assert!(!should_attach_token(
            "http://localhost:8080/api/users",
            api,
            register
        ));
        assert!(!should_attach_token(
            "https://keycloak.example.com/auth",
            api,
            register
        ));
        // 登録エンドポイント以外の /users 配下は対象
        assert!(should_attach_token(
            "http://localhost:8080/api/users/me",
            api,
            register
        ));
    }

    #[test]
    fn test_url_building() {
        let config = Config::development();
        let client = client(&config);

        let url = client
            .url_for(&Endpoint::JoinGroup(GroupId::new(4), UserId::new(9)))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/groups/4/join?userId=9");

        let url = client
            .url_for(&Endpoint::JoinByInviteCode {
                code: "ab cd".to_string(),
                user_id: UserId::new(9),
            })
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/groups/join/ab%20cd/9"
        );

        let url = client.url_for(&Endpoint::CreateUser).unwrap();
        assert_eq!(url.as_str(), config.register_user_endpoint);
    }

    #[test]
    fn test_anonymous_user_gets_no_token() {
        let config = Config::development();
        let client = client(&config);
        let url = client.url_for(&Endpoint::PublicGroups).unwrap();
        assert!(client.bearer_token(&url).is_none());
    }
}
