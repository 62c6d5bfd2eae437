//! グループ詳細から開くタスク作成ダイアログ

use crate::components::task_editor::{AssigneeCard, TaskEditor};
use domain::{GroupId, TaskForm, TaskPriority, TaskStatus, User, UserId, ValidationErrors};
use infrastructure::{DisplayTask, TasksService};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};

const CREATE_FAILED: &str = "Unable to create the task. Please try again.";

/// ダイアログを開くときに渡すデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTaskDialogData {
    pub group_id: GroupId,
    pub members: Vec<User>,
    pub user_id: UserId,
}

#[derive(Debug, Default)]
struct DialogState {
    editor: TaskEditor,
    field_errors: ValidationErrors,
    error_message: String,
    is_submitting: bool,
}

pub struct CreateTaskDialog {
    data: CreateTaskDialogData,
    tasks: TasksService,
    state: Mutex<DialogState>,
}

impl CreateTaskDialog {
    pub fn new(data: CreateTaskDialogData, tasks: TasksService) -> Self {
        let form = TaskForm {
            priority: TaskPriority::Medium,
            status: TaskStatus::Open,
            ..Default::default()
        };
        let state = DialogState {
            editor: TaskEditor::new(form, data.members.clone()),
            ..Default::default()
        };
        Self {
            data,
            tasks,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, DialogState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// フォームを書き換える
    pub fn edit(&self, update: impl FnOnce(&mut TaskEditor)) {
        update(&mut self.state().editor);
    }

    pub fn form(&self) -> TaskForm {
        self.state().editor.form.clone()
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

    /// タスクを作成する。作成できた場合のみダイアログを閉じて結果を返す
    pub async fn submit(&self) -> Option<DisplayTask> {
        let request = {
            let mut state = self.state();
            if state.is_submitting {
                return None;
            }

            let mut form = state.editor.form.clone();
            form.status = TaskStatus::Open;
            match form.to_request(self.data.user_id) {
                Ok(request) => {
                    state.field_errors = ValidationErrors::default();
                    state.error_message.clear();
                    state.is_submitting = true;
                    request
                }
                Err(errors) => {
                    // 入力欄のエラーがあればそちらを優先して表示する
                    if errors.has("title") || errors.has("description") {
                        state.field_errors = errors;
                    } else if let Some(message) = errors
                        .message_for("assignee_ids")
                        .or_else(|| errors.message_for("due_date"))
                    {
                        state.error_message = message.to_string();
                    }
                    return None;
                }
            }
        };

        let result = self.tasks.create_task(self.data.group_id, &request).await;

        let mut state = self.state();
        state.is_submitting = false;
        match result {
            Ok(created) => {
                info!("タスク作成ダイアログを閉じる: task_id={}", created.id());
                Some(created)
            }
            Err(e) => {
                error!("タスク作成に失敗: group_id={}, error={}", self.data.group_id, e);
                state.error_message = CREATE_FAILED.to_string();
                None
            }
        }
    }

    /// 何も作成せずに閉じる
    pub fn cancel(&self) -> Option<DisplayTask> {
        None
    }
}
