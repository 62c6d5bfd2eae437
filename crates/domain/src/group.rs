use crate::ids::{GroupId, UserId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 候補・検索結果として表示するグループの上限
pub const GROUP_LIST_LIMIT: usize = 10;

/// 最小の最大メンバー数
pub const MIN_MAX_MEMBERS: i32 = 2;

/// 学習グループ
/// メンバーと管理者は別途取得し、ここには含めない
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_public: bool,
    pub max_members: i32,
    #[serde(default)]
    pub member_count: i32,
    #[serde(default)]
    pub invite_code: String,
    #[serde(default)]
    pub created_by_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_updated_at: Option<NaiveDateTime>,
}

impl Group {
    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.member_count >= self.max_members
    }
}

/// グループ名とIDの組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
}

/// グループ作成リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_public: bool,
    pub max_members: i32,
    pub member_ids: Vec<UserId>,
    pub admin_ids: Vec<UserId>,
    pub created_by_id: UserId,
}

/// グループ更新リクエスト（PATCH）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_members: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_ids: Option<Vec<UserId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_ids: Option<Vec<UserId>>,
}

/// 空白のみの文字列を None にする
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_deserializes_server_payload() {
        let json = r#"{
            "id": 4,
            "name": "Algorithms",
            "description": null,
            "is_public": true,
            "created_by_id": 1,
            "created_at": "2026-01-31T14:05:00",
            "last_updated_at": "2026-02-01T09:00:00.123",
            "member_count": 3,
            "max_members": 10,
            "invite_code": "ALG-123"
        }"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.id, GroupId::new(4));
        assert!(group.is_public);
        assert!(group.description.is_none());
        assert_eq!(group.invite_code, "ALG-123");
        assert!(!group.is_full());
    }

    #[test]
    fn test_update_request_skips_unset_fields() {
        let request = UpdateGroupRequest {
            name: Some("New".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"name":"New"}"#);
    }

    #[test]
    fn test_trim_optional() {
        assert_eq!(trim_optional(Some("  hi ")), Some("hi".to_string()));
        assert_eq!(trim_optional(Some("   ")), None);
        assert_eq!(trim_optional(None), None);
    }
}
