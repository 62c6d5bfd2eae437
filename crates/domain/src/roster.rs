use crate::errors::DomainError;
use crate::ids::UserId;
use crate::task::add_unique;
use serde::{Deserialize, Serialize};

/// グループ編集中のメンバー・管理者一覧
///
/// 管理者は常にメンバーの部分集合。メンバーを外すと管理者からも外れる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRoster {
    members: Vec<UserId>,
    admins: Vec<UserId>,
}

/// 初期状態からの差分
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterRemovals {
    /// メンバーから外したユーザー
    pub members: Vec<UserId>,
    /// 管理者だけ外したユーザー（メンバーごと外したユーザーは含まない）
    pub admins: Vec<UserId>,
}

impl RosterRemovals {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.admins.is_empty()
    }
}

impl MemberRoster {
    /// サーバーから取得した一覧で作成
    /// メンバーでない管理者は取り除く
    pub fn new(members: Vec<UserId>, admins: Vec<UserId>) -> Self {
        let mut roster = Self::default();
        for member in members {
            roster.add_member(member);
        }
        for admin in admins {
            if roster.is_member(admin) {
                add_unique(&mut roster.admins, admin);
            }
        }
        roster
    }

    /// 作成者をメンバー兼管理者とした初期状態
    pub fn with_creator(creator: Option<UserId>) -> Self {
        match creator {
            Some(creator) => Self::new(vec![creator], vec![creator]),
            None => Self::default(),
        }
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn admins(&self) -> &[UserId] {
        &self.admins
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admins.contains(&user_id)
    }

    /// メンバーを追加（既にいれば何もしない）
    pub fn add_member(&mut self, user_id: UserId) {
        add_unique(&mut self.members, user_id);
    }

    /// 管理者に昇格。メンバーでなければエラー
    pub fn add_admin(&mut self, user_id: UserId) -> Result<(), DomainError> {
        if !self.is_member(user_id) {
            return Err(DomainError::AdminMustBeMember(user_id.to_string()));
        }
        add_unique(&mut self.admins, user_id);
        Ok(())
    }

    /// メンバーから外す。管理者権限も同時に外れる
    pub fn remove_member(&mut self, user_id: UserId) {
        self.members.retain(|id| *id != user_id);
        self.admins.retain(|id| *id != user_id);
    }

    pub fn remove_admin(&mut self, user_id: UserId) {
        self.admins.retain(|id| *id != user_id);
    }

    /// 初期状態と比べて外されたユーザーを求める
    pub fn removals_since(&self, initial: &MemberRoster) -> RosterRemovals {
        let members: Vec<UserId> = initial
            .members
            .iter()
            .copied()
            .filter(|id| !self.is_member(*id))
            .collect();
        let admins = initial
            .admins
            .iter()
            .copied()
            .filter(|id| !self.is_admin(*id) && !members.contains(id))
            .collect();

        RosterRemovals { members, admins }
    }
}
