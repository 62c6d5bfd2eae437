//! グループ詳細画面
//!
//! メンバーでなければ公開グループの参加画面か非公開の案内だけを表示する。
//! タスクのステータス変更は先に画面へ反映し、失敗したら元に戻す。

use crate::components::create_task_dialog::CreateTaskDialogData;
use crate::context::AppContext;
use crate::dialogs::{ConfirmDialog, StatusDialog};
use crate::resolvers::RouteData;
use domain::{member_label, tag_color, Group, TaskId, TaskStatus, User, UserId, TAG_FALLBACK_COLOR};
use infrastructure::DisplayTask;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{error, info, warn};

/// ステータスごとに一度に表示するタスク数
pub const TASK_PAGE_SIZE: usize = 5;

/// 管理者パネルに表示する人数
const VISIBLE_ADMINS: usize = 5;

#[derive(Debug, Default)]
struct DetailState {
    group: Option<Group>,
    members: Vec<User>,
    admins: Vec<User>,
    tasks: Vec<DisplayTask>,
    is_member: bool,
    is_admin: bool,
    visible_counts: HashMap<TaskStatus, usize>,
    updating_task_ids: HashSet<TaskId>,
}

pub struct GroupDetailPage {
    ctx: AppContext,
    user_id: Option<UserId>,
    state: Mutex<DetailState>,
}

impl GroupDetailPage {
    pub fn new(ctx: AppContext, data: RouteData) -> Self {
        let user_id = data.user_id;
        let mut state = DetailState::default();
        if let Some(resolved) = data.group {
            state.group = Some(resolved.group);
            state.members = resolved.members;
            state.admins = resolved.admins;
            state.tasks = resolved.tasks;
        }
        state.is_member = contains_user(&state.members, user_id);
        state.is_admin = contains_user(&state.admins, user_id);
        Self {
            ctx,
            user_id,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn group(&self) -> Option<Group> {
        self.state().group.clone()
    }

    pub fn members(&self) -> Vec<User> {
        self.state().members.clone()
    }

    pub fn tasks(&self) -> Vec<DisplayTask> {
        self.state().tasks.clone()
    }

    pub fn is_member(&self) -> bool {
        self.state().is_member
    }

    pub fn is_admin(&self) -> bool {
        self.state().is_admin
    }

    fn is_public(&self) -> bool {
        self.state().group.as_ref().map(|g| g.is_public).unwrap_or(false)
    }

    pub fn show_public_join(&self) -> bool {
        !self.is_member() && self.is_public()
    }

    pub fn show_private_blocked(&self) -> bool {
        !self.is_member() && !self.is_public()
    }

    pub fn show_group_detail(&self) -> bool {
        self.is_member()
    }

    pub fn visible_admins(&self) -> Vec<User> {
        self.state().admins.iter().take(VISIBLE_ADMINS).cloned().collect()
    }

    pub fn invite_code(&self) -> Option<String> {
        self.state()
            .group
            .as_ref()
            .map(|g| g.invite_code.clone())
            .filter(|code| !code.is_empty())
    }

    pub fn back_to_groups(&self) {
        self.ctx.navigate("/groups");
    }

    pub async fn join_group(&self) {
        let (Some(group_id), Some(user_id)) = (self.group().map(|g| g.id), self.user_id) else {
            return;
        };

        let result = async {
            self.ctx.groups.join_group(group_id, user_id).await?;
            self.ctx.groups.members(group_id).await
        }
        .await;

        match result {
            Ok(members) => {
                {
                    let mut state = self.state();
                    state.members = members;
                    state.is_member = true;
                }
                self.ctx.dialogs.show_status(StatusDialog::success(
                    "Join successful",
                    "You have successfully joined the group.",
                ));
            }
            Err(e) => {
                error!("グループ参加に失敗: group_id={}, error={}", group_id, e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Join failed",
                    "An error occurred while trying to join the group. Please try again later.",
                ));
            }
        }
    }

    /// 確認ダイアログの後にグループを退出する
    pub async fn confirm_leave_group(&self) {
        let Some(group) = self.group() else {
            return;
        };
        let dialog = ConfirmDialog::new(
            "Leave group?",
            format!(
                "You are about to leave \"{}\". You will lose access to its tasks.",
                group.name
            ),
        )
        .with_labels("Leave group", "Stay");
        if self.ctx.dialogs.confirm(dialog).await {
            self.leave_group().await;
        }
    }

    pub async fn leave_group(&self) {
        let (Some(group_id), Some(user_id)) = (self.group().map(|g| g.id), self.user_id) else {
            return;
        };

        match self.ctx.groups.leave_group(group_id, user_id).await {
            Ok(()) => {
                {
                    let mut state = self.state();
                    state.is_member = false;
                    state.is_admin = false;
                    state.members.retain(|member| member.id != user_id);
                }
                self.ctx.dialogs.show_status(StatusDialog::success(
                    "Leave successful",
                    "You have successfully left the group.",
                ));
            }
            Err(e) => {
                error!("グループ退出に失敗: group_id={}, error={}", group_id, e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Leave failed",
                    "An error occurred while trying to leave the group. Please try again later.",
                ));
            }
        }
    }

    /// 確認ダイアログの後にグループを削除する（管理者のみ）
    pub async fn confirm_delete_group(&self) {
        let Some(group) = self.group() else {
            return;
        };
        if !self.is_admin() {
            return;
        }
        let dialog = ConfirmDialog::new(
            "Delete group?",
            format!(
                "Deleting \"{}\" will remove the group and its tasks for everyone.",
                group.name
            ),
        )
        .with_labels("Delete group", "Cancel");
        if self.ctx.dialogs.confirm(dialog).await {
            self.delete_group().await;
        }
    }

    pub async fn delete_group(&self) {
        if !self.is_admin() {
            warn!("管理者以外はグループを削除できません");
            return;
        }
        let Some(group_id) = self.group().map(|g| g.id) else {
            return;
        };

        match self.ctx.groups.delete_group(group_id).await {
            Ok(()) => {
                self.ctx.dialogs.show_status(StatusDialog::success(
                    "Group deleted",
                    "The group has been successfully deleted.",
                ));
                self.back_to_groups();
            }
            Err(e) => {
                error!("グループ削除に失敗: group_id={}, error={}", group_id, e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Delete failed",
                    "An error occurred while trying to delete the group. Please try again later.",
                ));
            }
        }
    }

    /// 招待コードをクリップボードへ書き込む
    pub fn copy_invite_code<F>(&self, write: F)
    where
        F: FnOnce(&str) -> anyhow::Result<()>,
    {
        let Some(code) = self.invite_code() else {
            return;
        };
        if let Err(e) = write(&code) {
            error!("招待コードのコピーに失敗: {}", e);
            self.ctx.dialogs.show_status(
                StatusDialog::error(
                    "Copy failed",
                    "Unable to copy the invite code. Please copy it manually.",
                )
                .with_auto_close(Duration::from_millis(4000)),
            );
        }
    }

    /// タスク作成ダイアログを開き、作成されたタスクを先頭に加える
    pub async fn open_create_task_dialog(&self) {
        let (Some(group), Some(user_id)) = (self.group(), self.user_id) else {
            return;
        };
        let data = CreateTaskDialogData {
            group_id: group.id,
            members: self.members(),
            user_id,
        };

        let Some(created) = self.ctx.dialogs.create_task(data).await else {
            return;
        };
        let title = created.task.title.clone();
        self.state().tasks.insert(0, created);
        self.ctx.dialogs.show_status(StatusDialog::success(
            "Task created",
            format!("The task \"{title}\" has been created."),
        ));
    }

    pub fn open_task(&self, task_id: TaskId) {
        if let Some(group) = self.group() {
            self.ctx
                .navigate(&format!("/groups/{}/tasks/{}", group.id, task_id));
        }
    }

    pub fn is_updating_task(&self, task_id: TaskId) -> bool {
        self.state().updating_task_ids.contains(&task_id)
    }

    /// ステータスを先に反映してから保存する。失敗時は元のステータスに戻す
    pub async fn on_status_change(&self, task_id: TaskId, new_status: TaskStatus) {
        let (previous, request) = {
            let mut state = self.state();
            if state.updating_task_ids.contains(&task_id) {
                return;
            }
            let Some(entry) = state.tasks.iter_mut().find(|t| t.id() == task_id) else {
                return;
            };
            if entry.task.status == new_status {
                return;
            }
            let previous = entry.task.status;
            let request = entry.task.to_status_request(new_status);
            entry.task.status = new_status;
            state.updating_task_ids.insert(task_id);
            (previous, request)
        };

        let result = self.ctx.tasks.update_task(task_id, &request).await;

        let failed = {
            let mut state = self.state();
            state.updating_task_ids.remove(&task_id);
            let entry = state.tasks.iter_mut().find(|t| t.id() == task_id);
            match (result, entry) {
                (Ok(updated), Some(entry)) => {
                    info!("タスクのステータスを更新: task_id={}, status={}", task_id, new_status.as_str());
                    *entry = updated;
                    false
                }
                (Ok(_), None) => false,
                (Err(e), entry) => {
                    error!("タスクのステータス更新に失敗: task_id={}, error={}", task_id, e);
                    if let Some(entry) = entry {
                        entry.task.status = previous;
                    }
                    true
                }
            }
        };
        if failed {
            self.ctx.dialogs.show_status(StatusDialog::error(
                "Status update failed",
                "Unable to update the task status. Please try again.",
            ));
        }
    }

    pub fn tasks_for_status(&self, status: TaskStatus) -> Vec<DisplayTask> {
        self.state()
            .tasks
            .iter()
            .filter(|t| t.task.status == status)
            .cloned()
            .collect()
    }

    fn visible_count(&self, status: TaskStatus) -> usize {
        self.state()
            .visible_counts
            .get(&status)
            .copied()
            .unwrap_or(TASK_PAGE_SIZE)
    }

    pub fn visible_tasks_for_status(&self, status: TaskStatus) -> Vec<DisplayTask> {
        let count = self.visible_count(status);
        self.tasks_for_status(status).into_iter().take(count).collect()
    }

    pub fn has_more_tasks(&self, status: TaskStatus) -> bool {
        self.tasks_for_status(status).len() > self.visible_count(status)
    }

    pub fn show_more_tasks(&self, status: TaskStatus) {
        *self
            .state()
            .visible_counts
            .entry(status)
            .or_insert(TASK_PAGE_SIZE) += TASK_PAGE_SIZE;
    }

    /// 担当者名をカンマ区切りで。いなければ `Unassigned`
    pub fn assignee_names(&self, task: &DisplayTask) -> String {
        if task.task.assignee_ids.is_empty() {
            return "Unassigned".to_string();
        }
        let state = self.state();
        task.task
            .assignee_ids
            .iter()
            .map(|id| member_label(&state.members, *id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 先頭タグは計算済みの色を使う
    pub fn tag_color(&self, task: &DisplayTask, tag: &str) -> String {
        if tag.trim().is_empty() {
            return TAG_FALLBACK_COLOR.to_string();
        }
        if task.task.tags.first().map(String::as_str) == Some(tag) {
            if task.tags_hash_color.is_empty() {
                return TAG_FALLBACK_COLOR.to_string();
            }
            return task.tags_hash_color.clone();
        }
        tag_color(tag)
    }

    pub fn go_to_edit_group(&self) {
        if !self.is_admin() {
            return;
        }
        if let Some(group) = self.group() {
            self.ctx.navigate(&format!("/groups/{}/edit", group.id));
        }
    }
}

fn contains_user(users: &[User], user_id: Option<UserId>) -> bool {
    user_id
        .map(|id| users.iter().any(|user| user.id == id))
        .unwrap_or(false)
}
