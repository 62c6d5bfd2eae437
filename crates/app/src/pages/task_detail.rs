use crate::context::AppContext;
use crate::dialogs::StatusDialog;
use crate::resolvers::RouteData;
use domain::{format_enum_value, member_label, tag_color, TaskPriority, TaskStatus, User, UserId};
use infrastructure::DisplayTask;
use tracing::error;

/// タスク詳細画面
pub struct TaskDetailPage {
    ctx: AppContext,
    group_param: String,
    task_param: String,
    task: Option<DisplayTask>,
    members: Vec<User>,
    user_id: Option<UserId>,
}

impl TaskDetailPage {
    pub fn new(ctx: AppContext, group_param: &str, task_param: &str, data: RouteData) -> Self {
        Self {
            ctx,
            group_param: group_param.to_string(),
            task_param: task_param.to_string(),
            task: data.task,
            members: data.group_members.unwrap_or_default(),
            user_id: data.user_id,
        }
    }

    pub fn task(&self) -> Option<&DisplayTask> {
        self.task.as_ref()
    }

    pub fn members(&self) -> &[User] {
        &self.members
    }

    pub fn show_not_a_member(&self) -> bool {
        !self
            .members
            .iter()
            .any(|member| Some(member.id) == self.user_id)
    }

    pub fn back_to_group_detail(&self) {
        self.ctx.navigate(&format!("/groups/{}", self.group_param));
    }

    pub fn to_edit_task(&self) {
        self.ctx.navigate(&format!(
            "/groups/{}/tasks/{}/edit",
            self.group_param, self.task_param
        ));
    }

    pub fn member_label(&self, user_id: UserId) -> String {
        member_label(&self.members, user_id)
    }

    pub fn assignee_labels(&self, task: &DisplayTask) -> Vec<String> {
        task.task
            .assignee_ids
            .iter()
            .map(|id| self.member_label(*id))
            .collect()
    }

    pub fn creator_label(&self, task: &DisplayTask) -> String {
        self.member_label(task.task.created_by_id)
    }

    pub fn tag_color(&self, tag: &str) -> String {
        tag_color(tag)
    }

    pub fn format_status(&self, status: Option<TaskStatus>) -> String {
        status
            .map(|status| format_enum_value(status.as_str()))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn format_priority(&self, priority: Option<TaskPriority>) -> String {
        priority
            .map(|priority| format_enum_value(priority.as_str()))
            .unwrap_or_else(|| "-".to_string())
    }

    /// 削除に成功したらグループ詳細へ戻る
    pub async fn delete_task(&self) {
        let Some(task) = &self.task else {
            return;
        };
        match self.ctx.tasks.delete_task(task.id()).await {
            Ok(()) => self.back_to_group_detail(),
            Err(e) => {
                error!("タスク削除に失敗: task_id={}, error={}", task.id(), e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Delete failed",
                    "Unable to delete the task. Please try again.",
                ));
            }
        }
    }
}
