use crate::context::AppContext;
use crate::resolvers::RouteData;
use domain::{GroupSummary, UserId};
use infrastructure::DisplayTask;
use tracing::{error, info};

/// ログインユーザーのタスクと所属グループの一覧
pub struct DashboardPage {
    ctx: AppContext,
    user_id: Option<UserId>,
    tasks: Vec<DisplayTask>,
    groups: Vec<GroupSummary>,
}

impl DashboardPage {
    pub fn new(ctx: AppContext, data: RouteData) -> Self {
        Self {
            ctx,
            user_id: data.user_id,
            tasks: data.user_tasks.unwrap_or_default(),
            groups: data.user_groups.unwrap_or_default(),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn tasks(&self) -> &[DisplayTask] {
        &self.tasks
    }

    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    pub fn full_name(&self) -> Option<String> {
        self.ctx.auth.full_name()
    }

    pub async fn logout(&self) {
        match self.ctx.auth.logout().await {
            Ok(()) => info!("ダッシュボードからログアウト"),
            Err(e) => error!("ログアウトに失敗: {}", e),
        }
    }
}
