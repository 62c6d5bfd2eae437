use crate::errors::DomainError;
use crate::ids::{GroupId, TaskId, UserId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// タスクの優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn from_string(priority: &str) -> Result<Self, DomainError> {
        match priority.trim().to_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            _ => Err(DomainError::InvalidTaskPriority(priority.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// タスクの状態
/// どの状態からどの状態へも遷移できる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Open,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn from_string(status: &str) -> Result<Self, DomainError> {
        match status.trim().to_uppercase().replace(' ', "_").as_str() {
            "OPEN" => Ok(TaskStatus::Open),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            _ => Err(DomainError::InvalidTaskStatus(status.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "OPEN",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// タブ見出し用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Cancelled => "Cancelled",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Open
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `IN_PROGRESS` → `In progress` のように列挙値を読みやすくする
pub fn format_enum_value(value: &str) -> String {
    let normalized = value.to_lowercase().replace('_', " ");
    let mut chars = normalized.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// タスク
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_by_id: UserId,
    #[serde(default)]
    pub assignee_ids: Vec<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub last_status_change_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Task {
    /// 現在の内容から更新リクエストを組み立てる
    pub fn to_request(&self) -> TaskRequest {
        TaskRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            priority: self.priority,
            status: Some(self.status),
            category: self.category.clone(),
            tags: self.tags.clone(),
            created_by_id: self.created_by_id,
            assignee_ids: self.assignee_ids.clone(),
        }
    }

    /// 状態だけを差し替えた更新リクエスト
    pub fn to_status_request(&self, status: TaskStatus) -> TaskRequest {
        TaskRequest {
            status: Some(status),
            ..self.to_request()
        }
    }

    pub fn is_assigned_to(&self, user_id: UserId) -> bool {
        self.assignee_ids.contains(&user_id)
    }
}

/// タスク作成・更新リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_by_id: UserId,
    pub assignee_ids: Vec<UserId>,
}

/// タグを追加する。大文字小文字を無視して重複していれば追加しない
/// 追加した場合は true
pub fn add_tag(tags: &mut Vec<String>, raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    let normalized = trimmed.to_lowercase();
    if tags.iter().any(|tag| tag.to_lowercase() == normalized) {
        return false;
    }
    tags.push(trimmed.to_string());
    true
}

/// 順序を保ったままIDを追加（重複なし）
pub fn add_unique(ids: &mut Vec<UserId>, id: UserId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 11,
            "title": "Read chapter 3",
            "description": "Graphs",
            "due_date": "2026-11-01T18:00:00",
            "priority": "HIGH",
            "status": "IN_PROGRESS",
            "category": null,
            "tags": ["Exam", "reading"],
            "created_by_id": 1,
            "assignee_ids": [1, 2],
            "created_at": "2026-10-01T08:00:00",
            "updated_at": "2026-10-02T08:30:00",
            "group_id": 4
        }"#
    }

    #[test]
    fn test_task_wire_format() {
        let task: Task = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.group_id, Some(GroupId::new(4)));
        assert!(task.is_assigned_to(UserId::new(2)));

        let request = task.to_status_request(TaskStatus::Completed);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["status"], "COMPLETED");
        assert_eq!(json["priority"], "HIGH");
        assert_eq!(json["due_date"], "2026-11-01T18:00:00");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_status_from_string() {
        assert_eq!(TaskStatus::from_string("in progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::from_string("CANCELLED").unwrap(), TaskStatus::Cancelled);
        assert!(TaskStatus::from_string("done").is_err());
        assert_eq!(TaskPriority::from_string("low").unwrap(), TaskPriority::Low);
        assert!(TaskPriority::from_string("urgent").is_err());
    }

    #[test]
    fn test_format_enum_value() {
        assert_eq!(format_enum_value("IN_PROGRESS"), "In progress");
        assert_eq!(format_enum_value("HIGH"), "High");
        assert_eq!(format_enum_value(""), "");
    }

    #[test]
    fn test_add_tag_deduplicates_case_insensitively() {
        let mut tags = vec!["Exam".to_string()];
        assert!(!add_tag(&mut tags, "  exam "));
        assert!(!add_tag(&mut tags, "   "));
        assert!(add_tag(&mut tags, " Reading "));
        assert_eq!(tags, vec!["Exam".to_string(), "Reading".to_string()]);
    }
}
