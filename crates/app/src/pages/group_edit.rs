//! グループ編集画面（管理者のみ）
//!
//! 外されたメンバー・管理者は初期状態と比べて求め、更新の前に並行して削除する。

use crate::components::roster::{RosterEditor, UserCard};
use crate::context::AppContext;
use crate::dialogs::StatusDialog;
use crate::pages::create_group::{invalid_max_members_dialog, only_invalid_max_members};
use crate::resolvers::RouteData;
use domain::{
    AutocompleteOption, Group, GroupForm, GroupId, MemberRoster, RosterRemovals, UserId,
    ValidationErrors,
};
use futures::future::try_join_all;
use shared::AppError;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct EditState {
    group: Option<Group>,
    form: GroupForm,
    editor: RosterEditor,
    field_errors: ValidationErrors,
    is_submitting: bool,
}

pub struct GroupEditPage {
    ctx: AppContext,
    user_id: Option<UserId>,
    /// ルートパラメータのグループID（グループ未取得時の戻り先）
    group_param: String,
    initial_roster: MemberRoster,
    is_admin: bool,
    state: Mutex<EditState>,
}

impl GroupEditPage {
    pub fn new(ctx: AppContext, group_param: &str, data: RouteData) -> Self {
        let user_id = data.user_id;
        let options = data.users.unwrap_or_default();
        let mut state = EditState::default();

        let initial_roster = match data.group {
            Some(resolved) => {
                let roster = MemberRoster::new(
                    resolved.members.iter().map(|m| m.id).collect(),
                    resolved.admins.iter().map(|a| a.id).collect(),
                );
                state.form = GroupForm {
                    name: resolved.group.name.clone(),
                    description: resolved.group.description.clone().unwrap_or_default(),
                    is_public: resolved.group.is_public,
                    max_members: resolved.group.max_members.to_string(),
                };
                state.group = Some(resolved.group);
                roster
            }
            None => MemberRoster::default(),
        };
        state.editor = RosterEditor::new(initial_roster.clone(), options);
        let is_admin = user_id.map(|id| initial_roster.is_admin(id)).unwrap_or(false);

        Self {
            ctx,
            user_id,
            group_param: group_param.to_string(),
            initial_roster,
            is_admin,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn group(&self) -> Option<Group> {
        self.state().group.clone()
    }

    pub fn form(&self) -> GroupForm {
        self.state().form.clone()
    }

    pub fn edit_form(&self, update: impl FnOnce(&mut GroupForm)) {
        update(&mut self.state().form);
    }

    pub fn field_errors(&self) -> ValidationErrors {
        self.state().field_errors.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state().is_submitting
    }

    pub fn roster(&self) -> MemberRoster {
        self.state().editor.roster().clone()
    }

    pub fn filtered_member_options(&self, query: &str) -> Vec<AutocompleteOption> {
        self.state().editor.filter_member_options(query)
    }

    pub fn filtered_admin_options(&self, query: &str) -> Vec<AutocompleteOption> {
        self.state().editor.filter_admin_options(query)
    }

    pub fn member_cards(&self) -> Vec<UserCard> {
        self.state().editor.member_cards()
    }

    pub fn admin_cards(&self) -> Vec<UserCard> {
        self.state().editor.admin_cards()
    }

    pub fn add_member(&self, user_id: UserId) {
        self.state().editor.select_member(user_id);
    }

    pub fn add_admin(&self, user_id: UserId) {
        let result = self.state().editor.select_admin(user_id);
        if let Err(dialog) = result {
            self.ctx.dialogs.show_status(dialog);
        }
    }

    /// メンバーから外すと管理者からも外れる
    pub fn remove_member(&self, user_id: UserId) {
        self.state().editor.remove_member(user_id);
    }

    pub fn remove_admin(&self, user_id: UserId) {
        self.state().editor.remove_admin(user_id);
    }

    /// 初期状態と比べて外されたユーザー
    pub fn removals(&self) -> RosterRemovals {
        self.state().editor.roster().removals_since(&self.initial_roster)
    }

    pub fn back_to_group_detail(&self) {
        let group_id = self
            .state()
            .group
            .as_ref()
            .map(|g| g.id.to_string())
            .unwrap_or_else(|| self.group_param.clone());
        self.ctx.navigate(&format!("/groups/{group_id}"));
    }

    pub async fn submit(&self) -> bool {
        if !self.is_admin {
            warn!("管理者以外はグループを編集できません: user_id={:?}", self.user_id);
            return false;
        }

        let (group_id, request, removals) = {
            let mut state = self.state();
            if state.is_submitting {
                return false;
            }
            if let Err(errors) = state.form.validate() {
                if !only_invalid_max_members(&errors) {
                    state.field_errors = errors;
                    return false;
                }
            }
            let Some(group_id) = state.group.as_ref().map(|g| g.id) else {
                drop(state);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Missing group",
                    "Group details could not be loaded. Please try again.",
                ));
                return false;
            };
            let request = match state.form.to_update_request(state.editor.roster()) {
                Ok(request) => request,
                Err(errors) => {
                    state.field_errors = errors;
                    drop(state);
                    self.ctx.dialogs.show_status(invalid_max_members_dialog());
                    return false;
                }
            };
            let removals = state.editor.roster().removals_since(&self.initial_roster);
            state.field_errors = ValidationErrors::default();
            state.is_submitting = true;
            (group_id, request, removals)
        };

        let result = async {
            self.remove_members_and_admins(group_id, &removals).await?;
            self.ctx.groups.update_group(group_id, &request).await
        }
        .await;

        let mut state = self.state();
        state.is_submitting = false;
        match result {
            Ok(updated) => {
                info!("グループ更新成功: group_id={}", updated.id);
                let path = format!("/groups/{}", updated.id);
                let message = format!("The group \"{}\" has been updated.", updated.name);
                state.group = Some(updated);
                drop(state);
                self.ctx
                    .dialogs
                    .show_status(StatusDialog::success("Group updated", message));
                self.ctx.navigate(&path);
                true
            }
            Err(e) => {
                drop(state);
                error!("グループ更新に失敗: group_id={}, error={}", group_id, e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Update failed",
                    "An error occurred while updating the group. Please try again.",
                ));
                false
            }
        }
    }

    async fn remove_members_and_admins(
        &self,
        group_id: GroupId,
        removals: &RosterRemovals,
    ) -> Result<(), AppError> {
        if removals.is_empty() {
            return Ok(());
        }
        let admin_removals = try_join_all(
            removals
                .admins
                .iter()
                .map(|user_id| self.ctx.groups.remove_admin(group_id, *user_id)),
        );
        let member_removals = try_join_all(
            removals
                .members
                .iter()
                .map(|user_id| self.ctx.groups.leave_group(group_id, *user_id)),
        );
        futures::try_join!(admin_removals, member_removals)?;
        info!(
            "メンバー・管理者を削除: group_id={}, members={}, admins={}",
            group_id,
            removals.members.len(),
            removals.admins.len()
        );
        Ok(())
    }
}
