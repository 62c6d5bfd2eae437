use crate::components::form::{FormConfig, CREATE_GROUP_CONFIG};
use crate::components::roster::{RosterEditor, UserCard};
use crate::context::AppContext;
use crate::dialogs::StatusDialog;
use crate::resolvers::RouteData;
use domain::{AutocompleteOption, GroupForm, MemberRoster, UserId, ValidationErrors, INVALID_MAX_MEMBERS};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, warn};

/// 最大メンバー数が数値でないことだけが問題か
pub(crate) fn only_invalid_max_members(errors: &ValidationErrors) -> bool {
    !errors.is_empty()
        && errors
            .errors()
            .iter()
            .all(|e| e.field == "max_members" && e.message == INVALID_MAX_MEMBERS)
}

pub(crate) fn invalid_max_members_dialog() -> StatusDialog {
    StatusDialog::error("Invalid max members", INVALID_MAX_MEMBERS)
}

#[derive(Debug, Default)]
struct CreateGroupState {
    form: GroupForm,
    editor: RosterEditor,
    field_errors: ValidationErrors,
    is_submitting: bool,
}

/// グループ作成画面
pub struct CreateGroupPage {
    ctx: AppContext,
    current_user_id: Option<UserId>,
    state: Mutex<CreateGroupState>,
}

impl CreateGroupPage {
    /// ログインユーザーをメンバー兼管理者として選択済みにする
    pub fn new(ctx: AppContext, data: RouteData) -> Self {
        let current_user_id = data.user_id;
        let state = CreateGroupState {
            editor: RosterEditor::new(
                MemberRoster::with_creator(current_user_id),
                data.users.unwrap_or_default(),
            ),
            ..Default::default()
        };
        Self {
            ctx,
            current_user_id,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, CreateGroupState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn config(&self) -> &'static FormConfig {
        &CREATE_GROUP_CONFIG
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

    /// メンバーでないユーザーは管理者にできない
    pub fn add_admin(&self, user_id: UserId) {
        let result = self.state().editor.select_admin(user_id);
        if let Err(dialog) = result {
            self.ctx.dialogs.show_status(dialog);
        }
    }

    pub fn remove_member(&self, user_id: UserId) {
        self.state().editor.remove_member(user_id);
    }

    pub fn remove_admin(&self, user_id: UserId) {
        self.state().editor.remove_admin(user_id);
    }

    pub async fn submit(&self) -> bool {
        let request = {
            let mut state = self.state();
            if state.is_submitting {
                return false;
            }
            let validation = state.form.validate();
            if let Err(errors) = &validation {
                if !only_invalid_max_members(errors) {
                    warn!("グループ作成フォームが不正: {}", errors);
                    state.field_errors = errors.clone();
                    return false;
                }
            }
            let Some(creator) = self.current_user_id else {
                drop(state);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Missing user session",
                    "Please sign in before creating a group.",
                ));
                return false;
            };
            let request = match state.form.to_create_request(state.editor.roster(), creator) {
                Ok(request) => request,
                Err(errors) => {
                    state.field_errors = errors;
                    drop(state);
                    self.ctx.dialogs.show_status(invalid_max_members_dialog());
                    return false;
                }
            };
            state.field_errors = ValidationErrors::default();
            state.is_submitting = true;
            request
        };

        let result = self.ctx.groups.create_group(&request).await;
        self.state().is_submitting = false;

        match result {
            Ok(group) => {
                self.ctx.dialogs.show_status(StatusDialog::success(
                    "Group Created Successfully",
                    format!("The group \"{}\" has been created successfully.", group.name),
                ));
                self.ctx.navigate(&format!("/groups/{}", group.id));
                true
            }
            Err(e) => {
                error!("グループ作成に失敗: {}", e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Group Creation Failed",
                    "An error occurred while creating the group. Please try again.",
                ));
                false
            }
        }
    }
}
