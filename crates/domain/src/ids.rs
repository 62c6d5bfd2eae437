use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

/// サーバー採番の数値IDを表すnewtypeを定義する
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $error:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// ルートパラメータ文字列からIDを作成
            /// 空文字列や数値でない値はエラー
            pub fn from_param(param: &str) -> Result<Self, DomainError> {
                let trimmed = param.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::$error(format!(
                        "{} cannot be empty",
                        $label
                    )));
                }
                trimmed
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| DomainError::$error(format!("{} is not numeric: {param}", $label)))
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// ユーザーID
    UserId,
    InvalidUserId,
    "User ID"
);

numeric_id!(
    /// グループID
    GroupId,
    InvalidGroupId,
    "Group ID"
);

numeric_id!(
    /// タスクID
    TaskId,
    InvalidTaskId,
    "Task ID"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_param_accepts_numeric() {
        assert_eq!(GroupId::from_param("42").unwrap(), GroupId::new(42));
        assert_eq!(TaskId::from_param(" 7 ").unwrap().value(), 7);
    }

    #[test]
    fn test_from_param_rejects_non_numeric() {
        assert!(GroupId::from_param("abc").is_err());
        assert!(TaskId::from_param("").is_err());
        assert!(UserId::from_param("1.5").is_err());
        assert!(matches!(
            GroupId::from_param("x"),
            Err(DomainError::InvalidGroupId(_))
        ));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id: UserId = serde_json::from_str("15").unwrap();
        assert_eq!(id, UserId::new(15));
        assert_eq!(serde_json::to_string(&id).unwrap(), "15");
    }
}
