//! グループ一覧画面
//!
//! 参加中のグループ、公開グループのおすすめ、検索、招待コードでの参加を扱う。

use crate::components::table::{ButtonColor, DataTable, TableActionButton, TableColumn};
use crate::context::AppContext;
use crate::dialogs::StatusDialog;
use crate::resolvers::RouteData;
use domain::{Group, GroupId, UserId, GROUP_LIST_LIMIT};
use shared::AppError;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct GroupsState {
    user_groups: Vec<Group>,
    public_groups: Vec<Group>,
    search_query: String,
    last_search_query: String,
    search_results: Vec<Group>,
    is_searching: bool,
    joining_group_ids: HashSet<GroupId>,
    show_invite_join_form: bool,
    invite_code_input: String,
    join_by_invite_loading: bool,
}

pub struct GroupsPage {
    ctx: AppContext,
    user_id: Option<UserId>,
    state: Mutex<GroupsState>,
}

/// 参加失敗時のメッセージ
pub fn join_error_message(error: &AppError, group_name: &str) -> String {
    let base = format!("Could not join \"{group_name}\".");
    match error.api_message().map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => format!("{base} {message}"),
        None => format!("{base} Please try again."),
    }
}

impl GroupsPage {
    pub fn new(ctx: AppContext, data: RouteData) -> Self {
        Self {
            ctx,
            user_id: data.user_id,
            state: Mutex::new(GroupsState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, GroupsState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// 参加中グループと公開グループを読み込む
    pub async fn load(&self) {
        let result = match self.user_id {
            Some(user_id) => {
                let (joined, public) = tokio::join!(
                    self.ctx.groups.joined_groups(user_id),
                    self.ctx.groups.public_groups()
                );
                joined.and_then(|joined| public.map(|public| (joined, public)))
            }
            None => self
                .ctx
                .groups
                .public_groups()
                .await
                .map(|public| (Vec::new(), public)),
        };

        match result {
            Ok((joined, public)) => {
                info!(
                    "グループ一覧を読み込み: joined={}, public={}",
                    joined.len(),
                    public.len()
                );
                let mut state = self.state();
                state.user_groups = joined;
                state.public_groups = public;
            }
            Err(e) => error!("グループ一覧の読み込みに失敗: {}", e),
        }
    }

    pub fn user_groups(&self) -> Vec<Group> {
        self.state().user_groups.clone()
    }

    pub fn suggested_groups(&self) -> Vec<Group> {
        self.state()
            .public_groups
            .iter()
            .take(GROUP_LIST_LIMIT)
            .cloned()
            .collect()
    }

    pub fn has_joined_groups(&self) -> bool {
        !self.state().user_groups.is_empty()
    }

    pub fn has_suggested_groups(&self) -> bool {
        !self.state().public_groups.is_empty()
    }

    pub fn set_search_query(&self, query: &str) {
        self.state().search_query = query.to_string();
    }

    pub fn search_results(&self) -> Vec<Group> {
        self.state().search_results.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.state().is_searching
    }

    pub fn has_searched(&self) -> bool {
        !self.state().last_search_query.is_empty()
    }

    pub fn show_search_empty_state(&self) -> bool {
        let state = self.state();
        !state.last_search_query.is_empty() && !state.is_searching && state.search_results.is_empty()
    }

    /// 公開グループを検索する。空の入力なら検索をクリア
    pub async fn run_search(&self) {
        let query = {
            let mut state = self.state();
            let query = state.search_query.trim().to_string();
            if query.is_empty() {
                drop(state);
                self.clear_search();
                return;
            }
            state.is_searching = true;
            state.last_search_query = query.clone();
            query
        };

        let result = self.ctx.groups.search_public_groups(&query).await;

        let mut state = self.state();
        state.is_searching = false;
        match result {
            Ok(mut groups) => {
                groups.truncate(GROUP_LIST_LIMIT);
                state.search_results = groups;
            }
            Err(e) => error!("グループ検索に失敗: query={}, error={}", query, e),
        }
    }

    pub fn clear_search(&self) {
        let mut state = self.state();
        state.search_query.clear();
        state.last_search_query.clear();
        state.search_results.clear();
    }

    /// 検索結果の表
    pub fn search_table(&self) -> DataTable<Group> {
        let joined: HashSet<GroupId> = self.state().user_groups.iter().map(|g| g.id).collect();
        let joining = self.state().joining_group_ids.clone();
        let signed_in = self.user_id.is_some();

        let mut table = DataTable::new(vec![
            TableColumn::new("name", "Group"),
            TableColumn::new("description", "Description").unsortable(),
            TableColumn::new("member_count", "Members"),
            TableColumn::new("max_members", "Capacity"),
        ])
        .with_actions(vec![
            TableActionButton::new("view", "View group", ButtonColor::Primary),
            TableActionButton::new("join", "Join", ButtonColor::Accent).show_when(move |group: &Group| {
                signed_in && !joined.contains(&group.id) && !joining.contains(&group.id)
            }),
        ]);
        table.set_rows(self.search_results());
        table
    }

    pub fn view_group(&self, group: &Group) {
        self.ctx.navigate(&format!("/groups/{}", group.id));
    }

    pub fn create_group(&self) {
        self.ctx.navigate("/groups/create");
    }

    pub fn can_join_group(&self, group: &Group) -> bool {
        self.user_id.is_some() && !self.state().user_groups.iter().any(|g| g.id == group.id)
    }

    pub fn is_joining(&self, group_id: GroupId) -> bool {
        self.state().joining_group_ids.contains(&group_id)
    }

    /// 一覧から参加する。成功するとおすすめから参加中へ移る
    pub async fn join_group(&self, group: &Group) {
        let Some(user_id) = self.user_id else {
            return;
        };
        if !self.state().joining_group_ids.insert(group.id) {
            return;
        }

        let result = self
            .ctx
            .groups
            .join_by_invite_code(&group.invite_code, user_id)
            .await;

        let dialog = {
            let mut state = self.state();
            state.joining_group_ids.remove(&group.id);
            match result {
                Ok(()) => {
                    if !state.user_groups.iter().any(|g| g.id == group.id) {
                        state.user_groups.push(group.clone());
                    }
                    state.public_groups.retain(|g| g.id != group.id);
                    StatusDialog::success(
                        "Joined group",
                        format!("You are now a member of \"{}\".", group.name),
                    )
                }
                Err(e) => {
                    warn!("グループ参加に失敗: group_id={}, error={}", group.id, e);
                    StatusDialog::error("Join failed", join_error_message(&e, &group.name))
                }
            }
        };
        self.ctx.dialogs.show_status(dialog);
    }

    pub fn toggle_invite_join_form(&self) {
        let mut state = self.state();
        state.show_invite_join_form = !state.show_invite_join_form;
        if !state.show_invite_join_form {
            state.invite_code_input.clear();
        }
    }

    pub fn show_invite_join_form(&self) -> bool {
        self.state().show_invite_join_form
    }

    pub fn set_invite_code_input(&self, code: &str) {
        self.state().invite_code_input = code.to_string();
    }

    pub fn invite_code_input(&self) -> String {
        self.state().invite_code_input.clone()
    }

    pub fn join_by_invite_loading(&self) -> bool {
        self.state().join_by_invite_loading
    }

    /// 招待コードで参加し、成功したら一覧を再読み込みする
    pub async fn join_group_by_invite_code(&self, invite_code: &str) {
        let code = invite_code.trim();
        let Some(user_id) = self.user_id else {
            self.ctx.dialogs.show_status(StatusDialog::error(
                "Join unavailable",
                "Please sign in before joining a group.",
            ));
            return;
        };
        if code.is_empty() {
            return;
        }
        {
            let mut state = self.state();
            if state.join_by_invite_loading {
                return;
            }
            state.join_by_invite_loading = true;
        }

        let result = self.ctx.groups.join_by_invite_code(code, user_id).await;
        self.state().join_by_invite_loading = false;

        match result {
            Ok(()) => {
                self.load().await;
                {
                    let mut state = self.state();
                    state.invite_code_input.clear();
                    state.show_invite_join_form = false;
                }
                self.ctx.dialogs.show_status(StatusDialog::success(
                    "Joined group",
                    "You have successfully joined the group.",
                ));
            }
            Err(e) => {
                warn!("招待コードでの参加に失敗: {}", e);
                self.ctx.dialogs.show_status(StatusDialog::error(
                    "Join failed",
                    join_error_message(&e, "the group"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_error_message() {
        let api_error = AppError::Api {
            status: 409,
            message: Some("Group is full".to_string()),
        };
        assert_eq!(
            join_error_message(&api_error, "Algorithms"),
            "Could not join \"Algorithms\". Group is full"
        );

        let blank = AppError::Api {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(
            join_error_message(&blank, "Algorithms"),
            "Could not join \"Algorithms\". Please try again."
        );
        assert_eq!(
            join_error_message(&AppError::Network("offline".to_string()), "the group"),
            "Could not join \"the group\". Please try again."
        );
    }
}
