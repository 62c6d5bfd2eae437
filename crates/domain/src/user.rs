use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// ユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(alias = "surname")]
    pub firstname: String,
    pub lastname: String,
}

impl User {
    /// 「名 姓」形式の表示名
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// 担当者検索用のラベル（小文字）
    pub fn search_label(&self) -> String {
        format!("{} {} {}", self.firstname, self.lastname, self.email).to_lowercase()
    }

    pub fn to_autocomplete(&self) -> AutocompleteOption {
        AutocompleteOption {
            label: format!("{} ({})", self.display_name(), self.email),
            value: self.id,
        }
    }
}

/// ユーザー登録リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

/// ユーザー更新リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

/// オートコンプリートの選択肢
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteOption {
    pub label: String,
    pub value: UserId,
}

impl AutocompleteOption {
    /// ラベルから「(email)」部分を除いた名前
    pub fn name(&self) -> &str {
        let name = self.label.split('(').next().unwrap_or_default().trim();
        if name.is_empty() {
            &self.label
        } else {
            name
        }
    }
}

/// 選択肢一覧からユーザーの表示名を引く。見つからなければ `User <id>`
pub fn display_name_for(options: &[AutocompleteOption], user_id: UserId) -> String {
    options
        .iter()
        .find(|option| option.value == user_id)
        .map(|option| option.name().to_string())
        .unwrap_or_else(|| format!("User {user_id}"))
}

/// メンバー一覧からユーザーの表示名を引く。見つからなければ `User <id>`
pub fn member_label(members: &[User], user_id: UserId) -> String {
    members
        .iter()
        .find(|member| member.id == user_id)
        .map(User::display_name)
        .unwrap_or_else(|| format!("User {user_id}"))
}
