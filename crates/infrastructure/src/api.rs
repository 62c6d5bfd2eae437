use async_trait::async_trait;
use domain::{
    CreateGroupRequest, Group, GroupId, Task, TaskId, TaskRequest, UpdateGroupRequest, User,
    UserCreateRequest, UserId, UserUpdateRequest,
};
use reqwest::Method;
use shared::AppError;

/// REST API のエンドポイント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    // グループ
    PublicGroups,
    SearchGroups { query: String },
    CreateGroup,
    Group(GroupId),
    UpdateGroup(GroupId),
    DeleteGroup(GroupId),
    GroupMembers(GroupId),
    GroupAdmins(GroupId),
    RemoveMember(GroupId, UserId),
    RemoveAdmin(GroupId, UserId),
    JoinGroup(GroupId, UserId),
    JoinByInviteCode { code: String, user_id: UserId },
    Membership(UserId),
    // タスク
    GroupTasks(GroupId),
    CreateTask(GroupId),
    UpdateTask(TaskId),
    DeleteTask(TaskId),
    UserTasks(UserId),
    // ユーザー
    CreateUser,
    Users,
    CurrentUser,
    User(UserId),
    UpdateUser(UserId),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::CreateGroup
            | Endpoint::JoinGroup(..)
            | Endpoint::JoinByInviteCode { .. }
            | Endpoint::CreateTask(_)
            | Endpoint::CreateUser => Method::POST,
            Endpoint::UpdateGroup(_) => Method::PATCH,
            Endpoint::UpdateTask(_) | Endpoint::UpdateUser(_) => Method::PUT,
            Endpoint::DeleteGroup(_)
            | Endpoint::RemoveMember(..)
            | Endpoint::RemoveAdmin(..)
            | Endpoint::DeleteTask(_) => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// API ベースURLからの相対パス（エンコード前のセグメント）
    pub fn segments(&self) -> Vec<String> {
        fn seg(parts: &[&dyn std::fmt::Display]) -> Vec<String> {
            parts.iter().map(|part| part.to_string()).collect()
        }

        match self {
            Endpoint::PublicGroups | Endpoint::CreateGroup => seg(&[&"groups"]),
            Endpoint::SearchGroups { .. } => seg(&[&"groups", &"search"]),
            Endpoint::Group(id) | Endpoint::UpdateGroup(id) | Endpoint::DeleteGroup(id) => {
                seg(&[&"groups", id])
            }
            Endpoint::GroupMembers(id) => seg(&[&"groups", id, &"members"]),
            Endpoint::GroupAdmins(id) => seg(&[&"groups", id, &"admins"]),
            Endpoint::RemoveMember(group, user) => seg(&[&"groups", group, &"members", user]),
            Endpoint::RemoveAdmin(group, user) => seg(&[&"groups", group, &"admins", user]),
            Endpoint::JoinGroup(group, _) => seg(&[&"groups", group, &"join"]),
            Endpoint::JoinByInviteCode { code, user_id } => {
                seg(&[&"groups", &"join", code, user_id])
            }
            Endpoint::Membership(user) => seg(&[&"groups", &"membership", user]),
            Endpoint::GroupTasks(group) | Endpoint::CreateTask(group) => {
                seg(&[&"tasks", &"groups", group])
            }
            Endpoint::UpdateTask(id) | Endpoint::DeleteTask(id) => seg(&[&"tasks", id]),
            Endpoint::UserTasks(user) => seg(&[&"tasks", &"users", user]),
            Endpoint::CreateUser | Endpoint::Users => seg(&[&"users"]),
            Endpoint::CurrentUser => seg(&[&"users", &"me"]),
            Endpoint::User(id) | Endpoint::UpdateUser(id) => seg(&[&"users", id]),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::SearchGroups { query } => vec![("query", query.clone())],
            Endpoint::JoinGroup(_, user) => vec![("userId", user.to_string())],
            _ => Vec::new(),
        }
    }

    /// ログ用のパス表記
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    /// 操作名
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::PublicGroups => "list_public_groups",
            Endpoint::SearchGroups { .. } => "search_groups",
            Endpoint::CreateGroup => "create_group",
            Endpoint::Group(_) => "get_group",
            Endpoint::UpdateGroup(_) => "update_group",
            Endpoint::DeleteGroup(_) => "delete_group",
            Endpoint::GroupMembers(_) => "group_members",
            Endpoint::GroupAdmins(_) => "group_admins",
            Endpoint::RemoveMember(..) => "remove_member",
            Endpoint::RemoveAdmin(..) => "remove_admin",
            Endpoint::JoinGroup(..) => "join_group",
            Endpoint::JoinByInviteCode { .. } => "join_by_invite_code",
            Endpoint::Membership(_) => "groups_for_user",
            Endpoint::GroupTasks(_) => "tasks_for_group",
            Endpoint::CreateTask(_) => "create_task",
            Endpoint::UpdateTask(_) => "update_task",
            Endpoint::DeleteTask(_) => "delete_task",
            Endpoint::UserTasks(_) => "tasks_for_user",
            Endpoint::CreateUser => "create_user",
            Endpoint::Users => "list_users",
            Endpoint::CurrentUser => "current_user",
            Endpoint::User(_) => "get_user",
            Endpoint::UpdateUser(_) => "update_user",
        }
    }

    /// 認証なしで呼び出す公開エンドポイントか
    pub fn is_public(&self) -> bool {
        matches!(self, Endpoint::CreateUser)
    }
}

/// StudyConnect REST API
#[async_trait]
pub trait StudyConnectApi: Send + Sync {
    // グループ
    async fn list_public_groups(&self) -> Result<Vec<Group>, AppError>;
    async fn search_groups(&self, query: &str) -> Result<Vec<Group>, AppError>;
    async fn create_group(&self, request: &CreateGroupRequest) -> Result<Group, AppError>;
    async fn get_group(&self, group_id: GroupId) -> Result<Group, AppError>;
    async fn update_group(
        &self,
        group_id: GroupId,
        request: &UpdateGroupRequest,
    ) -> Result<Group, AppError>;
    async fn delete_group(&self, group_id: GroupId) -> Result<(), AppError>;
    async fn group_members(&self, group_id: GroupId) -> Result<Vec<User>, AppError>;
    async fn group_admins(&self, group_id: GroupId) -> Result<Vec<User>, AppError>;
    async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError>;
    async fn remove_admin(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError>;
    async fn join_group(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError>;
    async fn join_by_invite_code(&self, code: &str, user_id: UserId) -> Result<(), AppError>;
    async fn groups_for_user(&self, user_id: UserId) -> Result<Vec<Group>, AppError>;

    // タスク
    async fn tasks_for_group(&self, group_id: GroupId) -> Result<Vec<Task>, AppError>;
    async fn create_task(&self, group_id: GroupId, request: &TaskRequest)
        -> Result<Task, AppError>;
    async fn update_task(&self, task_id: TaskId, request: &TaskRequest) -> Result<Task, AppError>;
    async fn delete_task(&self, task_id: TaskId) -> Result<(), AppError>;
    async fn tasks_for_user(&self, user_id: UserId) -> Result<Vec<Task>, AppError>;

    // ユーザー
    async fn create_user(&self, request: &UserCreateRequest) -> Result<User, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn current_user(&self) -> Result<User, AppError>;
    async fn get_user(&self, user_id: UserId) -> Result<User, AppError>;
    async fn update_user(
        &self,
        user_id: UserId,
        request: &UserUpdateRequest,
    ) -> Result<User, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_and_methods() {
        let group = GroupId::new(4);
        let user = UserId::new(9);

        assert_eq!(Endpoint::PublicGroups.path(), "/groups");
        assert_eq!(Endpoint::UpdateGroup(group).method(), Method::PATCH);
        assert_eq!(
            Endpoint::RemoveAdmin(group, user).path(),
            "/groups/4/admins/9"
        );
        assert_eq!(Endpoint::RemoveAdmin(group, user).method(), Method::DELETE);
        assert_eq!(Endpoint::Membership(user).path(), "/groups/membership/9");
        assert_eq!(Endpoint::CreateTask(group).path(), "/tasks/groups/4");
        assert_eq!(Endpoint::CreateTask(group).method(), Method::POST);
        assert_eq!(Endpoint::UpdateTask(TaskId::new(3)).method(), Method::PUT);
        assert_eq!(Endpoint::CurrentUser.path(), "/users/me");
    }

    #[test]
    fn test_query_parameters() {
        let join = Endpoint::JoinGroup(GroupId::new(4), UserId::new(9));
        assert_eq!(join.path(), "/groups/4/join");
        assert_eq!(join.query(), vec![("userId", "9".to_string())]);

        let search = Endpoint::SearchGroups {
            query: "algo".to_string(),
        };
        assert_eq!(search.path(), "/groups/search");
        assert_eq!(search.query(), vec![("query", "algo".to_string())]);
    }

    #[test]
    fn test_invite_code_is_a_segment() {
        let endpoint = Endpoint::JoinByInviteCode {
            code: "ALG 12/3".to_string(),
            user_id: UserId::new(2),
        };
        assert_eq!(
            endpoint.segments(),
            vec!["groups", "join", "ALG 12/3", "2"]
        );
        assert!(!endpoint.is_public());
        assert!(Endpoint::CreateUser.is_public());
    }
}
