use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Invalid GroupId: {0}")]
    InvalidGroupId(String),

    #[error("Invalid TaskId: {0}")]
    InvalidTaskId(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid task status: {0}")]
    InvalidTaskStatus(String),

    #[error("Invalid task priority: {0}")]
    InvalidTaskPriority(String),

    // グループメンバー関連のエラー
    #[error("User {0} must be a member before becoming an admin")]
    AdminMustBeMember(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    // 期限日時のエラー
    #[error("Please provide both a due date and a due time.")]
    IncompleteDueDate,

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),
}
