//! ルート有効化前のデータ取得
//!
//! 取得失敗や数値でないIDパラメータは not-found へリダイレクトし、値なしで解決する。
//! 不正なパラメータでバックエンドを呼ぶことはない。リダイレクトは遷移ごとに一度だけ。

use crate::context::AppContext;
use crate::routes::{ResolveKey, Route};
use domain::{AutocompleteOption, DomainError, Group, GroupId, GroupSummary, TaskId, User, UserId};
use infrastructure::DisplayTask;
use serde::Serialize;
use std::future::Future;
use tracing::{error, warn};

/// リゾルバーの結果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Value(T),
    /// 値なし（遷移は続行）
    Empty,
    /// not-found へリダイレクトする（遷移は resolve が一度だけ行う）
    Redirected,
}

impl<T> Resolved<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Resolved::Value(value) => Some(value),
            Resolved::Empty | Resolved::Redirected => None,
        }
    }

    pub fn is_redirected(&self) -> bool {
        matches!(self, Resolved::Redirected)
    }
}

/// グループ詳細画面用にまとめて取得したデータ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResolvedData {
    pub group: Group,
    pub members: Vec<User>,
    pub tasks: Vec<DisplayTask>,
    pub admins: Vec<User>,
}

/// ルートに渡す取得済みデータ。画面側では常に欠けている可能性がある
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<AutocompleteOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_tasks: Option<Vec<DisplayTask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_groups: Option<Vec<GroupSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupResolvedData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_members: Option<Vec<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<DisplayTask>,
}

#[derive(Clone)]
pub struct Resolvers {
    ctx: AppContext,
}

impl Resolvers {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// ルートに必要なデータを並行して取得する
    /// どれかがリダイレクトした場合は None
    pub async fn resolve(&self, route: &Route) -> Option<RouteData> {
        if !params_are_numeric(route) {
            self.navigate_not_found();
            return None;
        }

        let keys = route.resolve_keys();
        let wants = |key: ResolveKey| keys.contains(&key);
        let group_param = route.group_param().unwrap_or_default();
        let task_param = route.task_param().unwrap_or_default();

        let (user_id, users, user_tasks, user_groups, group, group_members, task) = tokio::join!(
            when(wants(ResolveKey::UserId), self.user_id()),
            when(wants(ResolveKey::Users), self.users()),
            when(wants(ResolveKey::UserTasks), self.user_tasks()),
            when(wants(ResolveKey::UserGroups), self.user_groups()),
            when(wants(ResolveKey::GroupData), self.group_data(group_param)),
            when(wants(ResolveKey::GroupMembers), self.group_members(group_param)),
            when(wants(ResolveKey::Task), self.task(group_param, task_param)),
        );

        let redirected = users.is_redirected()
            || group.is_redirected()
            || group_members.is_redirected()
            || task.is_redirected();
        if redirected {
            self.navigate_not_found();
            return None;
        }

        Some(RouteData {
            user_id: user_id.value(),
            users: users.value(),
            user_tasks: user_tasks.value(),
            user_groups: user_groups.value(),
            group: group.value(),
            group_members: group_members.value(),
            task: task.value(),
        })
    }

    /// トークンに対応するユーザーのID
    async fn user_id(&self) -> Resolved<UserId> {
        match self.ctx.users.current_user_id().await {
            Some(user_id) => Resolved::Value(user_id),
            None => Resolved::Empty,
        }
    }

    /// 全ユーザーをオートコンプリート用に取得
    async fn users(&self) -> Resolved<Vec<AutocompleteOption>> {
        match self.ctx.users.autocomplete_options().await {
            Ok(options) => Resolved::Value(options),
            Err(e) => {
                error!("ユーザー一覧の取得に失敗: {}", e);
                Resolved::Redirected
            }
        }
    }

    /// ログインユーザーのタスク。失敗してもリダイレクトしない
    async fn user_tasks(&self) -> Resolved<Vec<DisplayTask>> {
        let Some(user_id) = self.ctx.users.current_user_id().await else {
            return Resolved::Empty;
        };
        match self.ctx.tasks.tasks_for_user(user_id).await {
            Ok(tasks) => Resolved::Value(tasks),
            Err(e) => {
                error!("ユーザーのタスク取得に失敗: user_id={}, error={}", user_id, e);
                Resolved::Empty
            }
        }
    }

    /// ログインユーザーの所属グループ。失敗してもリダイレクトしない
    async fn user_groups(&self) -> Resolved<Vec<GroupSummary>> {
        let Some(user_id) = self.ctx.users.current_user_id().await else {
            return Resolved::Empty;
        };
        match self.ctx.groups.group_summaries_for_user(user_id).await {
            Ok(groups) => Resolved::Value(groups),
            Err(e) => {
                error!("ユーザーのグループ取得に失敗: user_id={}, error={}", user_id, e);
                Resolved::Empty
            }
        }
    }

    /// グループ本体・メンバー・タスク・管理者を並行取得
    async fn group_data(&self, group_param: &str) -> Resolved<GroupResolvedData> {
        let Some(group_id) = self.parse_param(group_param, GroupId::from_param) else {
            return Resolved::Redirected;
        };

        let result = tokio::try_join!(
            self.ctx.groups.group(group_id),
            self.ctx.groups.members(group_id),
            self.ctx.tasks.tasks_for_group_display(group_id),
            self.ctx.groups.admins(group_id),
        );
        match result {
            Ok((group, members, tasks, admins)) => Resolved::Value(GroupResolvedData {
                group,
                members,
                tasks,
                admins,
            }),
            Err(e) => {
                error!("グループの取得に失敗: group_id={}, error={}", group_id, e);
                Resolved::Redirected
            }
        }
    }

    async fn group_members(&self, group_param: &str) -> Resolved<Vec<User>> {
        let Some(group_id) = self.parse_param(group_param, GroupId::from_param) else {
            return Resolved::Redirected;
        };
        match self.ctx.groups.members(group_id).await {
            Ok(members) => Resolved::Value(members),
            Err(e) => {
                error!("グループメンバーの取得に失敗: group_id={}, error={}", group_id, e);
                Resolved::Redirected
            }
        }
    }

    async fn task(&self, group_param: &str, task_param: &str) -> Resolved<DisplayTask> {
        let Some(group_id) = self.parse_param(group_param, GroupId::from_param) else {
            return Resolved::Redirected;
        };
        let Some(task_id) = self.parse_param(task_param, TaskId::from_param) else {
            return Resolved::Redirected;
        };
        match self.ctx.tasks.task_by_id(group_id, task_id).await {
            Ok(task) => Resolved::Value(task),
            Err(e) => {
                error!(
                    "タスクの取得に失敗: group_id={}, task_id={}, error={}",
                    group_id, task_id, e
                );
                Resolved::Redirected
            }
        }
    }

    /// 不正なパラメータなら None
    fn parse_param<T>(
        &self,
        param: &str,
        parse: fn(&str) -> Result<T, DomainError>,
    ) -> Option<T> {
        match parse(param) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("不正なルートパラメータ: {}", e);
                None
            }
        }
    }

    fn navigate_not_found(&self) {
        self.ctx.navigate(&Route::NotFound.path());
    }
}

/// グループID・タスクIDのパラメータがあればすべて数値か
fn params_are_numeric(route: &Route) -> bool {
    let group_ok = route
        .group_param()
        .map_or(true, |param| GroupId::from_param(param).is_ok());
    let task_ok = route
        .task_param()
        .map_or(true, |param| TaskId::from_param(param).is_ok());
    if !(group_ok && task_ok) {
        warn!("数値でないIDパラメータ: route={}", route.path());
    }
    group_ok && task_ok
}

async fn when<T, F>(enabled: bool, future: F) -> Resolved<T>
where
    F: Future<Output = Resolved<T>>,
{
    if enabled {
        future.await
    } else {
        Resolved::Empty
    }
}
