use crate::api::StudyConnectApi;
use domain::{AutocompleteOption, User, UserCreateRequest, UserId, UserUpdateRequest};
use futures::future::try_join_all;
use shared::AppError;
use std::sync::Arc;
use tracing::{error, info};

/// ユーザーAPIのラッパー
#[derive(Clone)]
pub struct UsersService {
    api: Arc<dyn StudyConnectApi>,
}

impl UsersService {
    pub fn new(api: Arc<dyn StudyConnectApi>) -> Self {
        Self { api }
    }

    /// ユーザー登録（認証不要）
    pub async fn create_user(&self, request: &UserCreateRequest) -> Result<User, AppError> {
        let user = self.api.create_user(request).await?;
        info!("ユーザー登録成功: user_id={}", user.id);
        Ok(user)
    }

    /// トークンに対応するユーザーのID。取得できなければ None
    pub async fn current_user_id(&self) -> Option<UserId> {
        match self.api.current_user().await {
            Ok(user) => Some(user.id),
            Err(e) => {
                error!("現在のユーザー取得に失敗: {}", e);
                None
            }
        }
    }

    pub async fn current_user(&self) -> Result<User, AppError> {
        self.api.current_user().await
    }

    /// 担当者選択用の選択肢一覧
    pub async fn autocomplete_options(&self) -> Result<Vec<AutocompleteOption>, AppError> {
        let users = self.api.list_users().await?;
        Ok(users.iter().map(User::to_autocomplete).collect())
    }

    /// 指定IDのユーザーを並行して取得する
    pub async fn users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<User>, AppError> {
        try_join_all(user_ids.iter().map(|id| self.api.get_user(*id))).await
    }

    pub async fn user(&self, user_id: UserId) -> Result<User, AppError> {
        self.api.get_user(user_id).await
    }

    pub async fn update_user(
        &self,
        user_id: UserId,
        request: &UserUpdateRequest,
    ) -> Result<User, AppError> {
        self.api.update_user(user_id, request).await
    }
}
