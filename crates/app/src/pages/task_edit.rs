use crate::components::task_editor::{AssigneeCard, TaskEditor};
use crate::context::AppContext;
use crate::dialogs::StatusDialog;
use crate::resolvers::RouteData;
use domain::{TaskForm, TaskPriority, TaskStatus, User, UserId, ValidationErrors};
use infrastructure::DisplayTask;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};

const UPDATE_FAILED: &str = "Unable to update the task. Please try again.";
const TASK_MISSING: &str = "Task data is missing.";

/// ステータス選択肢（値, ラベル）
pub const STATUS_OPTIONS: [(TaskStatus, &str); 4] = [
    (TaskStatus::Open, "Open"),
    (TaskStatus::InProgress, "In progress"),
    (TaskStatus::Completed, "Completed"),
    (TaskStatus::Cancelled, "Cancelled"),
];

pub const PRIORITY_OPTIONS: [(TaskPriority, &str); 3] = [
    (TaskPriority::Low, "Low"),
    (TaskPriority::Medium, "Medium"),
    (TaskPriority::High, "High"),
];

#[derive(Debug, Default)]
struct TaskEditState {
    task: Option<DisplayTask>,
    editor: TaskEditor,
    field_errors: ValidationErrors,
    error_message: String,
    is_submitting: bool,
}

/// タスク編集画面
pub struct TaskEditPage {
    ctx: AppContext,
    group_param: String,
    task_param: String,
    user_id: Option<UserId>,
    state: Mutex<TaskEditState>,
}

/// 取得したタスクでフォームを初期化する。期限は日付と時刻に分ける
fn form_from_task(task: Option<&DisplayTask>) -> TaskForm {
    let Some(task) = task.map(|t| &t.task) else {
        return TaskForm::default();
    };
    TaskForm {
        title: task.title.clone(),
        description: task.description.clone().unwrap_or_default(),
        category: task.category.clone().unwrap_or_default(),
        priority: task.priority,
        status: task.status,
        due_date: task.due_date.map(|due| due.date()),
        due_time: task.due_date.map(|due| due.time()),
        assignee_ids: task.assignee_ids.clone(),
        tags: task.tags.clone(),
    }
}

impl TaskEditPage {
    pub fn new(ctx: AppContext, group_param: &str, task_param: &str, data: RouteData) -> Self {
        let members = data.group_members.unwrap_or_default();
        let state = TaskEditState {
            editor: TaskEditor::new(form_from_task(data.task.as_ref()), members),
            task: data.task,
            ..Default::default()
        };
        Self {
            ctx,
            group_param: group_param.to_string(),
            task_param: task_param.to_string(),
            user_id: data.user_id,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, TaskEditState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn task(&self) -> Option<DisplayTask> {
        self.state().task.clone()
    }

    pub fn form(&self) -> TaskForm {
        self.state().editor.form.clone()
    }

    pub fn edit(&self, update: impl FnOnce(&mut TaskEditor)) {
        update(&mut self.state().editor);
    }

    pub fn show_not_a_member(&self) -> bool {
        !self
            .state()
            .editor
            .members()
            .iter()
            .any(|member| Some(member.id) == self.user_id)
    }

    pub fn filtered_assignees(&self, query: &str) -> Vec<User> {
        self.state()
            .editor
            .filtered_assignees(query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn assignee_cards(&self) -> Vec<AssigneeCard> {
        self.state().editor.assignee_cards()
    }

    pub fn field_errors(&self) -> ValidationErrors {
        self.state().field_errors.clone()
    }

    pub fn error_message(&self) -> String {
        self.state().error_message.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state().is_submitting
    }

    pub fn back_to_task_detail(&self) {
        self.ctx.navigate(&format!(
            "/groups/{}/tasks/{}",
            self.group_param, self.task_param
        ));
    }

    fn back_to_group_detail(&self) {
        self.ctx.navigate(&format!("/groups/{}", self.group_param));
    }

    /// 更新に成功したらタスク詳細へ戻る
    pub async fn submit(&self) -> bool {
        let (task_id, request) = {
            let mut state = self.state();
            if state.is_submitting {
                return false;
            }
            let errors = state.editor.form.validate().err().unwrap_or_default();
            if errors.has("title") || errors.has("description") {
                state.field_errors = errors;
                return false;
            }
            if let Some(message) = errors.message_for("assignee_ids") {
                state.error_message = message.to_string();
                return false;
            }
            let Some((task_id, created_by)) =
                state.task.as_ref().map(|t| (t.id(), t.task.created_by_id))
            else {
                state.error_message = TASK_MISSING.to_string();
                return false;
            };
            let request = match state.editor.form.to_request(created_by) {
                Ok(request) => request,
                Err(errors) => {
                    state.error_message = errors
                        .message_for("due_date")
                        .unwrap_or(UPDATE_FAILED)
                        .to_string();
                    return false;
                }
            };
            state.field_errors = ValidationErrors::default();
            state.error_message.clear();
            state.is_submitting = true;
            (task_id, request)
        };

        let result = self.ctx.tasks.update_task(task_id, &request).await;

        let updated = {
            let mut state = self.state();
            state.is_submitting = false;
            match result {
                Ok(updated) => {
                    info!("タスク更新成功: task_id={}", task_id);
                    state.task = Some(updated);
                    true
                }
                Err(e) => {
                    error!("タスク更新に失敗: task_id={}, error={}", task_id, e);
                    state.error_message = UPDATE_FAILED.to_string();
                    false
                }
            }
        };
        if updated {
            self.back_to_task_detail();
        }
        updated
    }

    /// 削除に成功したらグループ詳細へ戻る
    pub async fn delete_task(&self) {
        let Some(task_id) = self.state().task.as_ref().map(DisplayTask::id) else {
            return;
        };
        match self.ctx.tasks.delete_task(task_id).await {
            Ok(()) => self.back_to_group_detail(),
            Err(e) => {
                error!("タスク削除に失敗: task_id={}, error={}", task_id, e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Delete failed",
                    "Unable to delete the task. Please try again.",
                ));
            }
        }
    }
}
