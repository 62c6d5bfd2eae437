//! グループ作成・編集画面のメンバー/管理者選択

use crate::components::form::filter_user_options;
use crate::dialogs::StatusDialog;
use domain::{display_name_for, AutocompleteOption, MemberRoster, UserId};
use serde::Serialize;
use tracing::warn;

/// 選択済みユーザーの表示用カード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCard {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterEditor {
    roster: MemberRoster,
    options: Vec<AutocompleteOption>,
}

impl RosterEditor {
    pub fn new(roster: MemberRoster, options: Vec<AutocompleteOption>) -> Self {
        Self { roster, options }
    }

    pub fn roster(&self) -> &MemberRoster {
        &self.roster
    }

    pub fn options(&self) -> &[AutocompleteOption] {
        &self.options
    }

    pub fn set_options(&mut self, options: Vec<AutocompleteOption>) {
        self.options = options;
    }

    /// まだメンバーでないユーザーの候補
    pub fn filter_member_options(&self, query: &str) -> Vec<AutocompleteOption> {
        filter_user_options(&self.options, query, self.roster.members())
    }

    /// まだ管理者でないユーザーの候補
    pub fn filter_admin_options(&self, query: &str) -> Vec<AutocompleteOption> {
        filter_user_options(&self.options, query, self.roster.admins())
    }

    pub fn member_cards(&self) -> Vec<UserCard> {
        self.cards(self.roster.members())
    }

    pub fn admin_cards(&self) -> Vec<UserCard> {
        self.cards(self.roster.admins())
    }

    pub fn select_member(&mut self, user_id: UserId) {
        self.roster.add_member(user_id);
    }

    /// 管理者に追加する。メンバーでなければ表示すべきダイアログを返す
    pub fn select_admin(&mut self, user_id: UserId) -> Result<(), StatusDialog> {
        self.roster.add_admin(user_id).map_err(|e| {
            warn!("管理者の選択を拒否: {}", e);
            StatusDialog::error(
                "Invalid Admin Selection",
                "Please add the user as a member before making them an admin.",
            )
        })
    }

    pub fn remove_member(&mut self, user_id: UserId) {
        self.roster.remove_member(user_id);
    }

    pub fn remove_admin(&mut self, user_id: UserId) {
        self.roster.remove_admin(user_id);
    }

    fn cards(&self, ids: &[UserId]) -> Vec<UserCard> {
        ids.iter()
            .map(|id| UserCard {
                id: *id,
                name: display_name_for(&self.options, *id),
            })
            .collect()
    }
}
