use crate::api::StudyConnectApi;
use domain::{
    CreateGroupRequest, Group, GroupId, GroupSummary, UpdateGroupRequest, User, UserId,
};
use shared::AppError;
use std::sync::Arc;
use tracing::info;

/// グループAPIのラッパー
#[derive(Clone)]
pub struct GroupsService {
    api: Arc<dyn StudyConnectApi>,
}

impl GroupsService {
    pub fn new(api: Arc<dyn StudyConnectApi>) -> Self {
        Self { api }
    }

    pub async fn create_group(&self, request: &CreateGroupRequest) -> Result<Group, AppError> {
        let group = self.api.create_group(request).await?;
        info!("グループ作成成功: group_id={}, name={}", group.id, group.name);
        Ok(group)
    }

    pub async fn search_public_groups(&self, query: &str) -> Result<Vec<Group>, AppError> {
        self.api.search_groups(query).await
    }

    pub async fn public_groups(&self) -> Result<Vec<Group>, AppError> {
        self.api.list_public_groups().await
    }

    pub async fn join_by_invite_code(&self, code: &str, user_id: UserId) -> Result<(), AppError> {
        self.api.join_by_invite_code(code, user_id).await?;
        info!("招待コードで参加: user_id={}", user_id);
        Ok(())
    }

    pub async fn joined_groups(&self, user_id: UserId) -> Result<Vec<Group>, AppError> {
        self.api.groups_for_user(user_id).await
    }

    pub async fn group(&self, group_id: GroupId) -> Result<Group, AppError> {
        self.api.get_group(group_id).await
    }

    pub async fn members(&self, group_id: GroupId) -> Result<Vec<User>, AppError> {
        self.api.group_members(group_id).await
    }

    pub async fn admins(&self, group_id: GroupId) -> Result<Vec<User>, AppError> {
        self.api.group_admins(group_id).await
    }

    /// メンバーから外す（自身の退会にも使う）
    pub async fn leave_group(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        self.api.remove_member(group_id, user_id).await?;
        info!("グループから退出: group_id={}, user_id={}", group_id, user_id);
        Ok(())
    }

    pub async fn remove_admin(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        self.api.remove_admin(group_id, user_id).await
    }

    pub async fn delete_group(&self, group_id: GroupId) -> Result<(), AppError> {
        self.api.delete_group(group_id).await?;
        info!("グループ削除成功: group_id={}", group_id);
        Ok(())
    }

    pub async fn join_group(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        self.api.join_group(group_id, user_id).await?;
        info!("グループ参加成功: group_id={}, user_id={}", group_id, user_id);
        Ok(())
    }

    pub async fn update_group(
        &self,
        group_id: GroupId,
        request: &UpdateGroupRequest,
    ) -> Result<Group, AppError> {
        self.api.update_group(group_id, request).await
    }

    /// ユーザーが所属するグループの名前とIDの一覧
    pub async fn group_summaries_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<GroupSummary>, AppError> {
        let groups = self.api.groups_for_user(user_id).await?;
        Ok(groups.iter().map(Group::summary).collect())
    }
}
