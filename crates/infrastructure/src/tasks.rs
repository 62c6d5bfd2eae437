use crate::api::StudyConnectApi;
use domain::{format_display, optional_tag_color, GroupId, Task, TaskId, TaskRequest, UserId};
use serde::Serialize;
use shared::AppError;
use std::sync::Arc;
use tracing::{info, warn};

/// 表示用に整形したタスク
/// 日時は `dd.MM.yyyy, HH:mm`、色は先頭タグから毎回計算する
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTask {
    #[serde(flatten)]
    pub task: Task,
    pub tags_hash_color: String,
    pub created_at_display: String,
    pub updated_at_display: String,
    pub last_status_change_at_display: Option<String>,
    pub due_date_display: Option<String>,
}

impl DisplayTask {
    pub fn from_task(task: Task) -> Self {
        Self {
            tags_hash_color: optional_tag_color(task.tags.first().map(String::as_str)),
            created_at_display: format_display(&task.created_at),
            updated_at_display: format_display(&task.updated_at),
            last_status_change_at_display: task.last_status_change_at.as_ref().map(format_display),
            due_date_display: task.due_date.as_ref().map(format_display),
            task,
        }
    }

    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// タスクAPIのラッパー
#[derive(Clone)]
pub struct TasksService {
    api: Arc<dyn StudyConnectApi>,
}

impl TasksService {
    pub fn new(api: Arc<dyn StudyConnectApi>) -> Self {
        Self { api }
    }

    pub async fn tasks_for_group(&self, group_id: GroupId) -> Result<Vec<Task>, AppError> {
        self.api.tasks_for_group(group_id).await
    }

    pub async fn tasks_for_group_display(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<DisplayTask>, AppError> {
        let tasks = self.api.tasks_for_group(group_id).await?;
        Ok(tasks.into_iter().map(DisplayTask::from_task).collect())
    }

    pub async fn create_task(
        &self,
        group_id: GroupId,
        request: &TaskRequest,
    ) -> Result<DisplayTask, AppError> {
        let task = self.api.create_task(group_id, request).await?;
        info!("タスク作成成功: group_id={}, task_id={}", group_id, task.id);
        Ok(DisplayTask::from_task(task))
    }

    pub async fn update_task(
        &self,
        task_id: TaskId,
        request: &TaskRequest,
    ) -> Result<DisplayTask, AppError> {
        let task = self.api.update_task(task_id, request).await?;
        Ok(DisplayTask::from_task(task))
    }

    pub async fn delete_task(&self, task_id: TaskId) -> Result<(), AppError> {
        self.api.delete_task(task_id).await?;
        info!("タスク削除成功: task_id={}", task_id);
        Ok(())
    }

    pub async fn tasks_for_user(&self, user_id: UserId) -> Result<Vec<DisplayTask>, AppError> {
        let tasks = self.api.tasks_for_user(user_id).await?;
        Ok(tasks.into_iter().map(DisplayTask::from_task).collect())
    }

    /// グループのタスク一覧から1件を取り出す
    pub async fn task_by_id(
        &self,
        group_id: GroupId,
        task_id: TaskId,
    ) -> Result<DisplayTask, AppError> {
        let tasks = self.api.tasks_for_group(group_id).await?;
        match tasks.into_iter().find(|task| task.id == task_id) {
            Some(task) => Ok(DisplayTask::from_task(task)),
            None => {
                warn!("グループにタスクが存在しません: group_id={}, task_id={}", group_id, task_id);
                Err(AppError::NotFound(format!(
                    "Task {task_id} not found in group {group_id}"
                )))
            }
        }
    }

    pub fn tag_color(&self, tag: Option<&str>) -> String {
        optional_tag_color(tag)
    }
}
