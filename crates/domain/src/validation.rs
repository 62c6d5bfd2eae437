use crate::due_date::build_due_date;
use crate::errors::DomainError;
use crate::group::{trim_optional, CreateGroupRequest, UpdateGroupRequest, MIN_MAX_MEMBERS};
use crate::ids::UserId;
use crate::roster::MemberRoster;
use crate::task::{TaskPriority, TaskRequest, TaskStatus};
use crate::user::UserCreateRequest;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const TITLE_MAX_LENGTH: usize = 200;
pub const DESCRIPTION_MAX_LENGTH: usize = 1000;
pub const GROUP_NAME_MAX_LENGTH: usize = 100;
pub const GROUP_DESCRIPTION_MAX_LENGTH: usize = 500;

/// 最大メンバー数が数値でないときのメッセージ
pub const INVALID_MAX_MEMBERS: &str = "Please enter a valid maximum member count.";

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("valid regex")
});

// パスワードは許可文字のみ・8文字以上で、小文字/大文字/数字/記号をそれぞれ含む
static PASSWORD_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"^[A-Za-z0-9@$!%*?&"#§€<>_\-/|(),\\\]{}]{8,}$"##).expect("valid regex")
});
static PASSWORD_LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("valid regex"));
static PASSWORD_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("valid regex"));
static PASSWORD_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("valid regex"));
static PASSWORD_SPECIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"[@$!%*?&"#§€<>_\-/|(),\\\]{}]"##).expect("valid regex")
});

/// 入力欄ごとのエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// フォーム全体のエラー一覧
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// エラーがなければ Ok
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors.to_string())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// パスワードの複雑さを検証
pub fn is_strong_password(password: &str) -> bool {
    PASSWORD_CHARSET.is_match(password)
        && PASSWORD_LOWER.is_match(password)
        && PASSWORD_UPPER.is_match(password)
        && PASSWORD_DIGIT.is_match(password)
        && PASSWORD_SPECIAL.is_match(password)
}

/// ユーザー登録フォーム
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.email.trim().is_empty() {
            errors.push("email", "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.push("email", "Please provide a valid email address");
        }
        if self.firstname.trim().is_empty() {
            errors.push("firstname", "Firstname is required");
        }
        if self.lastname.trim().is_empty() {
            errors.push("lastname", "Lastname is required");
        }
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        } else if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.push("password", "Password must be at least 8 characters");
        } else if !is_strong_password(&self.password) {
            errors.push(
                "password",
                "Password needs an uppercase letter, a lowercase letter, a number and a special character",
            );
        }

        errors.into_result()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn to_request(&self) -> Result<UserCreateRequest, ValidationErrors> {
        self.validate()?;
        Ok(UserCreateRequest {
            firstname: self.firstname.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// グループ作成・編集フォーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupForm {
    pub name: String,
    pub description: String,
    pub is_public: bool,
    /// 入力欄の生の値
    pub max_members: String,
}

impl Default for GroupForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            is_public: true,
            max_members: String::new(),
        }
    }
}

impl GroupForm {
    pub fn validate(&self) -> Result<i32, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("name", "Name is required");
        } else if name.chars().count() > GROUP_NAME_MAX_LENGTH {
            errors.push("name", "Name must not exceed 100 characters");
        }
        if self.description.trim().chars().count() > GROUP_DESCRIPTION_MAX_LENGTH {
            errors.push("description", "Description must not exceed 500 characters");
        }

        let raw = self.max_members.trim();
        let max_members = if raw.is_empty() {
            errors.push("max_members", "Maximum members is required");
            None
        } else {
            match raw.parse::<i32>() {
                Ok(value) if value >= MIN_MAX_MEMBERS => Some(value),
                Ok(_) => {
                    errors.push("max_members", "A group needs room for at least 2 members");
                    None
                }
                Err(_) => {
                    errors.push("max_members", INVALID_MAX_MEMBERS);
                    None
                }
            }
        };

        match max_members {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(errors),
        }
    }

    pub fn to_create_request(
        &self,
        roster: &MemberRoster,
        created_by_id: UserId,
    ) -> Result<CreateGroupRequest, ValidationErrors> {
        let max_members = self.validate()?;
        Ok(CreateGroupRequest {
            name: self.name.trim().to_string(),
            description: trim_optional(Some(&self.description)),
            is_public: self.is_public,
            max_members,
            member_ids: roster.members().to_vec(),
            admin_ids: roster.admins().to_vec(),
            created_by_id,
        })
    }

    pub fn to_update_request(
        &self,
        roster: &MemberRoster,
    ) -> Result<UpdateGroupRequest, ValidationErrors> {
        let max_members = self.validate()?;
        Ok(UpdateGroupRequest {
            name: Some(self.name.trim().to_string()),
            description: trim_optional(Some(&self.description)),
            is_public: Some(self.is_public),
            max_members: Some(max_members),
            member_ids: Some(roster.members().to_vec()),
            admin_ids: Some(roster.admins().to_vec()),
        })
    }
}

/// タスク作成・編集フォーム
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub assignee_ids: Vec<UserId>,
    pub tags: Vec<String>,
}

impl TaskForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push("title", "Title is required");
        } else if title.chars().count() > TITLE_MAX_LENGTH {
            errors.push("title", "Title must not exceed 200 characters");
        }
        if self.description.trim().chars().count() > DESCRIPTION_MAX_LENGTH {
            errors.push("description", "Description must not exceed 1000 characters");
        }
        if self.assignee_ids.is_empty() {
            errors.push("assignee_ids", "Please assign at least one member to the task.");
        }
        if let Err(error) = build_due_date(self.due_date, self.due_time) {
            errors.push("due_date", error.to_string());
        }

        errors.into_result()
    }

    pub fn to_request(&self, created_by_id: UserId) -> Result<TaskRequest, ValidationErrors> {
        self.validate()?;
        let due_date = build_due_date(self.due_date, self.due_time).unwrap_or_default();
        Ok(TaskRequest {
            title: self.title.trim().to_string(),
            description: trim_optional(Some(&self.description)),
            due_date,
            priority: self.priority,
            status: Some(self.status),
            category: trim_optional(Some(&self.category)),
            tags: self.tags.clone(),
            created_by_id,
            assignee_ids: self.assignee_ids.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(password: &str) -> RegistrationForm {
        RegistrationForm {
            email: "student@uni.de".to_string(),
            firstname: "Max".to_string(),
            lastname: "Muster".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_weak_password_keeps_form_invalid() {
        let form = registration("password");
        let errors = form.validate().unwrap_err();
        assert!(errors.has("password"));
        assert!(!form.is_valid());
        assert!(form.to_request().is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(is_strong_password("Secure#Pass1"));
        assert!(is_strong_password("Abcdef1!"));
        assert!(!is_strong_password("Abc1!"));
        assert!(!is_strong_password("abcdefg1!"));
        assert!(!is_strong_password("ABCDEFG1!"));
        assert!(!is_strong_password("Abcdefgh!"));
        assert!(!is_strong_password("Abcdefgh1"));
        // 許可されていない文字を含む
        assert!(!is_strong_password("Abcdef1! space"));
    }

    #[test]
    fn test_password_digit_must_be_ascii() {
        assert!(is_strong_password("Abcdefg@1"));
        // アラビア・インド数字は数字として扱わない
        assert!(!is_strong_password("Abcdefg@\u{0661}"));
    }

    #[test]
    fn test_valid_registration_builds_request() {
        let request = registration("Secure#Pass1").to_request().unwrap();
        assert_eq!(request.firstname, "Max");
        assert_eq!(request.email, "student@uni.de");
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a.b@uni-hamburg.de"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@"));
        let mut form = registration("Secure#Pass1");
        form.email = "broken".to_string();
        assert_eq!(
            form.validate().unwrap_err().message_for("email"),
            Some("Please provide a valid email address")
        );
    }

    #[test]
    fn test_group_form_max_members() {
        let mut form = GroupForm {
            name: "  Algorithms ".to_string(),
            max_members: "1".to_string(),
            ..Default::default()
        };
        assert!(form.validate().unwrap_err().has("max_members"));

        form.max_members = "abc".to_string();
        assert_eq!(
            form.validate().unwrap_err().message_for("max_members"),
            Some("Please enter a valid maximum member count.")
        );

        form.max_members = "12".to_string();
        let roster = MemberRoster::with_creator(Some(UserId::new(1)));
        let request = form.to_create_request(&roster, UserId::new(1)).unwrap();
        assert_eq!(request.name, "Algorithms");
        assert_eq!(request.max_members, 12);
        assert_eq!(request.member_ids, vec![UserId::new(1)]);
        assert!(request.description.is_none());
    }

    #[test]
    fn test_task_form_rules() {
        let mut form = TaskForm {
            title: "   ".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("title"));
        assert_eq!(
            errors.message_for("assignee_ids"),
            Some("Please assign at least one member to the task.")
        );

        form.title = "Read".to_string();
        form.assignee_ids = vec![UserId::new(2)];
        form.due_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        assert_eq!(
            form.validate().unwrap_err().message_for("due_date"),
            Some("Please provide both a due date and a due time.")
        );

        form.due_time = NaiveTime::from_hms_opt(10, 0, 0);
        let request = form.to_request(UserId::new(1)).unwrap();
        assert!(request.due_date.is_some());
        assert_eq!(request.status, Some(TaskStatus::Open));
        assert_eq!(request.priority, TaskPriority::Medium);
    }
}
