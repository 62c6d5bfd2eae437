use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// トークン有効性の確認間隔
pub const TOKEN_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// 残り有効期間がこれを下回ったらリフレッシュする
pub const TOKEN_MIN_VALIDITY: Duration = Duration::from_secs(70);

/// 実行環境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_string(environment: &str) -> Result<Self, AppError> {
        match environment.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(AppError::Configuration(format!(
                "Unknown environment: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// 起動時に固定されるアプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Environment,
    pub api_url: String,
    /// 認証なしで呼び出すユーザー登録エンドポイント
    pub register_user_endpoint: String,
    pub identity_provider_url: String,
    pub realm_name: String,
    pub client_id: String,
    pub required_role: String,
    pub debug_auth: bool,
    pub token_poll_interval: Duration,
    pub token_min_validity: Duration,
}

impl Config {
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api_url: "http://localhost:8080/api".to_string(),
            register_user_endpoint: "http://localhost:8080/api/users".to_string(),
            identity_provider_url: "https://keycloak.example.com/auth".to_string(),
            realm_name: "studyconnect".to_string(),
            client_id: "studyconnect-frontend".to_string(),
            required_role: "studyconnect".to_string(),
            debug_auth: false,
            token_poll_interval: TOKEN_POLL_INTERVAL,
            token_min_validity: TOKEN_MIN_VALIDITY,
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api_url: "http://localhost:8088/api".to_string(),
            register_user_endpoint: "http://localhost:8088/api/users".to_string(),
            identity_provider_url: "https://keycloakswt.duckdns.org".to_string(),
            ..Self::development()
        }
    }

    /// 環境変数から設定を読み込む
    /// 未設定の項目は `STUDYCONNECT_ENV` に応じたプリセット値を使う
    pub fn from_env() -> Result<Self, AppError> {
        let environment = match env::var("STUDYCONNECT_ENV") {
            Ok(value) => Environment::from_string(&value)?,
            Err(_) => Environment::Development,
        };
        let preset = match environment {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
        };

        let config = Config {
            environment,
            api_url: env::var("API_URL").unwrap_or(preset.api_url),
            register_user_endpoint: env::var("REGISTER_USER_ENDPOINT")
                .unwrap_or(preset.register_user_endpoint),
            identity_provider_url: env::var("IDENTITY_PROVIDER_URL")
                .unwrap_or(preset.identity_provider_url),
            realm_name: env::var("REALM_NAME").unwrap_or(preset.realm_name),
            client_id: env::var("CLIENT_ID").unwrap_or(preset.client_id),
            required_role: env::var("REQUIRED_ROLE").unwrap_or(preset.required_role),
            debug_auth: env::var("DEBUG_AUTH")
                .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true"))
                .unwrap_or(preset.debug_auth),
            token_poll_interval: preset.token_poll_interval,
            token_min_validity: preset.token_min_validity,
        };
        config.validate()?;
        Ok(config)
    }

    /// URL項目を検証
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("API_URL", &self.api_url),
            ("REGISTER_USER_ENDPOINT", &self.register_user_endpoint),
            ("IDENTITY_PROVIDER_URL", &self.identity_provider_url),
        ] {
            reqwest::Url::parse(value)
                .map_err(|e| AppError::Configuration(format!("{name} is not a valid URL: {e}")))?;
        }
        if self.required_role.trim().is_empty() {
            return Err(AppError::Configuration(
                "REQUIRED_ROLE cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// API の完全なURLを組み立てる
    pub fn api_endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
