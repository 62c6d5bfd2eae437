use serde::{Deserialize, Serialize};
use thiserror::Error;

/// クライアント全体で使用されるエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // ドメインエラー
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    // リソースエラー
    #[error("Resource not found: {0}")]
    NotFound(String),

    // 認証・認可エラー
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid JWT token: {0}")]
    InvalidJwt(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Validation failed: {0}")]
    Validation(String),

    // API・通信エラー
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // システムエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// エラーの扱い方による分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// 画面遷移・データ解決の失敗（not-found へリダイレクト）
    Navigation,
    /// 更新系操作の失敗（ダイアログ・バナーで通知し状態を戻す）
    Mutation,
    /// 401（トーストで通知）
    Authentication,
    /// 入力検証の失敗（送信をブロック）
    Validation,
}

impl AppError {
    /// HTTPステータスとレスポンス本文からエラーを作る
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_api_message(body);
        match status {
            401 => AppError::Unauthorized(message.unwrap_or_else(|| "Unauthorized".to_string())),
            403 => AppError::Forbidden(message.unwrap_or_else(|| "Forbidden".to_string())),
            404 => AppError::NotFound(message.unwrap_or_else(|| "Not found".to_string())),
            _ => AppError::Api { status, message },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::NotFound(_) => ErrorCategory::Navigation,
            AppError::Unauthorized(_)
            | AppError::Authentication(_)
            | AppError::InvalidJwt(_)
            | AppError::TokenExpired => ErrorCategory::Authentication,
            AppError::Domain(_) | AppError::Validation(_) => ErrorCategory::Validation,
            _ => ErrorCategory::Mutation,
        }
    }

    /// HTTPステータスコードを取得
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::NotFound(_) => Some(404),
            AppError::Unauthorized(_) => Some(401),
            AppError::Forbidden(_) => Some(403),
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// サーバーが返したメッセージ（あれば）
    pub fn api_message(&self) -> Option<&str> {
        match self {
            AppError::Api { message, .. } => message.as_deref(),
            AppError::NotFound(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(_) => "The requested resource could not be found.".to_string(),
            AppError::Unauthorized(_) => "You are not allowed to access this resource".to_string(),
            AppError::Forbidden(_) => "You do not have permission to perform this action.".to_string(),
            AppError::Authentication(_) | AppError::InvalidJwt(_) | AppError::TokenExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AppError::Domain(error) => error.to_string(),
            AppError::Validation(message) => message.clone(),
            AppError::Network(_) => "The server could not be reached. Please try again.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Deserialization(error.to_string())
    }
}

/// エラーレスポンス本文から `message` または `error` を取り出す
/// JSONでなければ本文そのもの（空なら None）
pub fn extract_api_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            AppError::NotFound("group".to_string()).category(),
            ErrorCategory::Navigation
        );
        assert_eq!(
            AppError::Unauthorized("x".to_string()).category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AppError::from(domain::DomainError::IncompleteDueDate).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            AppError::Api { status: 500, message: None }.category(),
            ErrorCategory::Mutation
        );
    }

    #[test]
    fn test_from_status_extracts_message() {
        let error = AppError::from_status(409, r#"{"message":"Group is full"}"#);
        assert_eq!(error.status_code(), Some(409));
        assert_eq!(error.api_message(), Some("Group is full"));

        let error = AppError::from_status(500, "");
        assert_eq!(error.api_message(), None);

        let error = AppError::from_status(404, r#"{"error":"Task not found"}"#);
        assert!(matches!(error, AppError::NotFound(_)));
        assert_eq!(error.api_message(), Some("Task not found"));
    }

    #[test]
    fn test_plain_text_body_is_message() {
        assert_eq!(
            extract_api_message("  invalid invite code "),
            Some("invalid invite code".to_string())
        );
        assert_eq!(extract_api_message(r#"{"status":400}"#), None);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AppError::Unauthorized("x".to_string()).user_message(),
            "You are not allowed to access this resource"
        );
        assert_eq!(
            AppError::Validation("Name is required".to_string()).user_message(),
            "Name is required"
        );
    }
}
