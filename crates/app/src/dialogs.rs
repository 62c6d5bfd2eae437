//! ステータス・確認ダイアログ
//!
//! 実際の表示は UI 側の `Dialogs` 実装に任せる。

use crate::components::create_task_dialog::CreateTaskDialogData;
use async_trait::async_trait;
use infrastructure::DisplayTask;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

/// ステータスダイアログの既定の自動クローズ時間
pub const DEFAULT_AUTO_CLOSE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Success,
    Error,
    Info,
}

impl DialogKind {
    pub fn icon(&self) -> &'static str {
        match self {
            DialogKind::Success => "check_circle",
            DialogKind::Error => "error",
            DialogKind::Info => "info",
        }
    }
}

/// 操作結果を知らせるダイアログ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDialog {
    pub title: String,
    pub message: String,
    pub kind: DialogKind,
    /// 未指定なら既定値。ゼロなら自動で閉じない
    pub auto_close: Option<Duration>,
}

impl StatusDialog {
    pub fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            auto_close: None,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Error, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Info, title, message)
    }

    pub fn with_auto_close(mut self, auto_close: Duration) -> Self {
        self.auto_close = Some(auto_close);
        self
    }

    /// 自動で閉じるまでの時間
    pub fn auto_close_after(&self) -> Option<Duration> {
        let auto_close = self.auto_close.unwrap_or(DEFAULT_AUTO_CLOSE);
        (!auto_close.is_zero()).then_some(auto_close)
    }
}

/// はい/いいえを確認するダイアログ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_text: Option<String>,
    pub cancel_text: Option<String>,
}

impl ConfirmDialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_text: None,
            cancel_text: None,
        }
    }

    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_text = Some(confirm.into());
        self.cancel_text = Some(cancel.into());
        self
    }

    pub fn confirm_label(&self) -> &str {
        self.confirm_text.as_deref().unwrap_or("Confirm")
    }

    pub fn cancel_label(&self) -> &str {
        self.cancel_text.as_deref().unwrap_or("Cancel")
    }
}

/// UI 側が提供するダイアログ表示
#[async_trait]
pub trait Dialogs: Send + Sync {
    fn show_status(&self, dialog: StatusDialog);

    /// 確認されたら true
    async fn confirm(&self, dialog: ConfirmDialog) -> bool;

    /// タスク作成ダイアログを開き、作成されたタスクを返す（キャンセル時は None）
    async fn create_task(&self, data: CreateTaskDialogData) -> Option<DisplayTask>;
}

/// 表示要求を記録し、あらかじめ決めた応答を返すダイアログ
///
/// 確認ダイアログの応答が用意されていなければキャンセル扱い。
#[derive(Debug, Default)]
pub struct RecordingDialogs {
    statuses: Mutex<Vec<StatusDialog>>,
    confirmations: Mutex<Vec<ConfirmDialog>>,
    confirm_answers: Mutex<VecDeque<bool>>,
    created_tasks: Mutex<VecDeque<DisplayTask>>,
}

impl RecordingDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の確認ダイアログへの応答を積む
    pub fn answer_confirm(&self, answer: bool) {
        if let Ok(mut answers) = self.confirm_answers.lock() {
            answers.push_back(answer);
        }
    }

    /// 次のタスク作成ダイアログが返すタスクを積む
    pub fn queue_created_task(&self, task: DisplayTask) {
        if let Ok(mut tasks) = self.created_tasks.lock() {
            tasks.push_back(task);
        }
    }

    pub fn statuses(&self) -> Vec<StatusDialog> {
        self.statuses
            .lock()
            .map(|statuses| statuses.clone())
            .unwrap_or_default()
    }

    pub fn last_status(&self) -> Option<StatusDialog> {
        self.statuses().pop()
    }

    pub fn confirmations(&self) -> Vec<ConfirmDialog> {
        self.confirmations
            .lock()
            .map(|confirmations| confirmations.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Dialogs for RecordingDialogs {
    fn show_status(&self, dialog: StatusDialog) {
        match dialog.kind {
            DialogKind::Error => warn!("ダイアログ表示: title={}, message={}", dialog.title, dialog.message),
            _ => info!("ダイアログ表示: title={}, message={}", dialog.title, dialog.message),
        }
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(dialog);
        }
    }

    async fn confirm(&self, dialog: ConfirmDialog) -> bool {
        if let Ok(mut confirmations) = self.confirmations.lock() {
            confirmations.push(dialog);
        }
        self.confirm_answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(false)
    }

    async fn create_task(&self, data: CreateTaskDialogData) -> Option<DisplayTask> {
        info!("タスク作成ダイアログ: group_id={}", data.group_id);
        self.created_tasks
            .lock()
            .ok()
            .and_then(|mut tasks| tasks.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_dialog_auto_close_defaults_to_five_seconds() {
        let dialog = StatusDialog::success("Saved", "All good");
        assert_eq!(dialog.auto_close_after(), Some(Duration::from_millis(5000)));
        assert_eq!(dialog.kind.icon(), "check_circle");

        let sticky = StatusDialog::error("Oops", "Nope").with_auto_close(Duration::ZERO);
        assert_eq!(sticky.auto_close_after(), None);
    }

    #[test]
    fn test_confirm_dialog_default_labels() {
        let dialog = ConfirmDialog::new("Delete?", "Really?");
        assert_eq!(dialog.confirm_label(), "Confirm");
        assert_eq!(dialog.cancel_label(), "Cancel");

        let dialog = dialog.with_labels("Leave group", "Stay");
        assert_eq!(dialog.confirm_label(), "Leave group");
        assert_eq!(dialog.cancel_label(), "Stay");
    }

    #[tokio::test]
    async fn test_recording_dialogs_answers_in_order() {
        let dialogs = RecordingDialogs::new();
        dialogs.answer_confirm(true);

        assert!(dialogs.confirm(ConfirmDialog::new("a", "b")).await);
        assert!(!dialogs.confirm(ConfirmDialog::new("c", "d")).await);
        assert_eq!(dialogs.confirmations().len(), 2);

        dialogs.show_status(StatusDialog::info("Hi", "there"));
        assert_eq!(dialogs.last_status().map(|d| d.title), Some("Hi".to_string()));
    }
}
