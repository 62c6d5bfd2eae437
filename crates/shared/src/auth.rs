use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// ログイン後の既定リダイレクト先
pub const DEFAULT_LOGIN_REDIRECT: &str = "/dashboard";

/// ロール一覧
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// アクセストークンのクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "firstName")]
    pub given_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub family_name: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub realm_access: Option<RoleAccess>,
    #[serde(default)]
    pub resource_access: HashMap<String, RoleAccess>,
}

impl Claims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    /// 有効期限までの残り秒数（期限切れなら 0）
    pub fn remaining_validity(&self, now: i64) -> Duration {
        Duration::from_secs(u64::try_from(self.exp - now).unwrap_or(0))
    }

    pub fn realm_roles(&self) -> &[String] {
        self.realm_access
            .as_ref()
            .map(|access| access.roles.as_slice())
            .unwrap_or_default()
    }

    pub fn client_roles(&self, client_id: &str) -> &[String] {
        self.resource_access
            .get(client_id)
            .map(|access| access.roles.as_slice())
            .unwrap_or_default()
    }

    /// レルムロールまたは指定クライアントのロールを持つか
    pub fn has_role(&self, role: &str, client_id: &str) -> bool {
        self.realm_roles().iter().any(|r| r == role)
            || self.client_roles(client_id).iter().any(|r| r == role)
    }

    /// `name` クレーム、なければ名と姓を連結
    pub fn full_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        match (self.given_name.as_deref(), self.family_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                Some(format!("{first} {last}"))
            }
            _ => None,
        }
    }
}

/// JWTのペイロードを取り出す
/// 署名検証はAPIサーバー側で行うため、ここではクレームの解析のみ
pub fn decode_claims(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::InvalidJwt(e.to_string()))
}

/// 外部IDプロバイダーの抽象
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// SSOセッションを確認し、認証済みかを返す
    async fn init(&self) -> Result<bool, AppError>;
    async fn login(&self, redirect_uri: &str) -> Result<(), AppError>;
    async fn logout(&self) -> Result<(), AppError>;
    /// 残り有効期間が `min_validity` 未満ならリフレッシュする
    /// リフレッシュした場合は true
    async fn update_token(&self, min_validity: Duration) -> Result<bool, AppError>;
    fn is_authenticated(&self) -> bool;
    fn is_token_expired(&self) -> bool;
    fn token(&self) -> Option<String>;
    fn claims(&self) -> Option<Claims>;
}

#[derive(Debug, Clone)]
struct Session {
    token: String,
    claims: Claims,
}

/// 発行済みのアクセストークンをそのまま使うプロバイダー
/// リフレッシュはできない
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    session: RwLock<Option<Session>>,
}

impl StaticTokenProvider {
    pub fn new(token: &str) -> Result<Self, AppError> {
        let claims = decode_claims(token)?;
        Ok(Self {
            session: RwLock::new(Some(Session {
                token: token.to_string(),
                claims,
            })),
        })
    }

    /// 未ログイン状態
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 環境変数 `STUDYCONNECT_ACCESS_TOKEN` から作成（未設定なら未ログイン）
    pub fn from_env() -> Result<Self, AppError> {
        match std::env::var("STUDYCONNECT_ACCESS_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Self::new(token.trim()),
            _ => Ok(Self::anonymous()),
        }
    }

    fn session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn init(&self) -> Result<bool, AppError> {
        Ok(self.is_authenticated())
    }

    async fn login(&self, redirect_uri: &str) -> Result<(), AppError> {
        info!("ログインが要求されました: redirect_uri={}", redirect_uri);
        Err(AppError::Authentication(
            "Interactive login is not available with a static token".to_string(),
        ))
    }

    async fn logout(&self) -> Result<(), AppError> {
        let mut guard = self
            .session
            .write()
            .map_err(|e| AppError::Internal(format!("Session lock poisoned: {e}")))?;
        *guard = None;
        Ok(())
    }

    async fn update_token(&self, min_validity: Duration) -> Result<bool, AppError> {
        let session = self
            .session()
            .ok_or_else(|| AppError::Authentication("Not signed in".to_string()))?;
        let now = chrono::Utc::now().timestamp();
        if session.claims.is_expired_at(now) {
            return Err(AppError::TokenExpired);
        }
        if session.claims.remaining_validity(now) < min_validity {
            debug!("静的トークンはリフレッシュできません: sub={}", session.claims.sub);
        }
        Ok(false)
    }

    fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    fn is_token_expired(&self) -> bool {
        match self.session() {
            Some(session) => session.claims.is_expired_at(chrono::Utc::now().timestamp()),
            None => true,
        }
    }

    fn token(&self) -> Option<String> {
        self.session().map(|session| session.token)
    }

    fn claims(&self) -> Option<Claims> {
        self.session().map(|session| session.claims)
    }
}

/// 認証状態の管理
///
/// 認証済みになるとトークンの有効性を定期的に確認し、期限切れまたは
/// リフレッシュ失敗時には強制的にログアウトする。
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    config: Arc<Config>,
    state: Arc<watch::Sender<bool>>,
    refresh_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: Config) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            provider,
            config: Arc::new(config),
            state: Arc::new(state),
            refresh_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 認証状態の購読
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// プロバイダーを初期化する。失敗しても例外にはせず false を返す
    pub async fn init(&self) -> bool {
        match self.provider.init().await {
            Ok(authenticated) => {
                self.state.send_replace(authenticated);
                if authenticated {
                    self.start_token_refresh();
                }
                if self.config.debug_auth {
                    self.log_roles("init");
                }
                info!("認証初期化完了: authenticated={}", authenticated);
                true
            }
            Err(e) => {
                error!("IDプロバイダーの初期化に失敗: {}", e);
                false
            }
        }
    }

    /// 定期的なトークン確認を開始（既存のタスクは停止）
    fn start_token_refresh(&self) {
        self.stop_token_refresh();

        let service = self.clone();
        let interval = self.config.token_poll_interval;
        let min_validity = self.config.token_min_validity;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 初回の即時tickを読み飛ばす
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if service.provider.is_token_expired() {
                    warn!("トークンの有効期限切れ、ログアウトします");
                    service.end_session().await;
                    break;
                }
                if let Err(e) = service.provider.update_token(min_validity).await {
                    error!("トークンのリフレッシュに失敗: {}", e);
                    service.end_session().await;
                    break;
                }
            }
        });

        if let Ok(mut guard) = self.refresh_task.lock() {
            *guard = Some(handle);
        }
    }

    fn stop_token_refresh(&self) {
        if let Ok(mut guard) = self.refresh_task.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }

    /// 確認タスク内からのログアウト（自身はabortしない）
    async fn end_session(&self) {
        if let Ok(mut guard) = self.refresh_task.lock() {
            guard.take();
        }
        self.state.send_replace(false);
        if let Err(e) = self.provider.logout().await {
            error!("ログアウトに失敗: {}", e);
        }
    }

    pub async fn login(&self, redirect_uri: Option<&str>) -> Result<(), AppError> {
        self.provider
            .login(redirect_uri.unwrap_or(DEFAULT_LOGIN_REDIRECT))
            .await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.stop_token_refresh();
        self.state.send_replace(false);
        self.provider.logout().await
    }

    /// 有効なアクセストークン（期限切れなら None）
    pub fn token(&self) -> Option<String> {
        if self.provider.is_token_expired() {
            warn!("トークンの有効期限が切れています");
            return None;
        }
        self.provider.token()
    }

    pub fn is_authenticated(&self) -> bool {
        if !self.config.is_production() {
            return self.provider.is_authenticated();
        }
        self.provider.is_authenticated() && !self.provider.is_token_expired()
    }

    /// 開発環境では未認証ならロール確認を省略する
    pub fn has_role(&self, role: &str) -> bool {
        if !self.config.is_production() && !self.is_authenticated() {
            return true;
        }
        self.provider
            .claims()
            .map(|claims| claims.has_role(role, &self.config.client_id))
            .unwrap_or(false)
    }

    pub fn has_required_role(&self) -> bool {
        self.has_role(&self.config.required_role)
    }

    pub fn user_email(&self) -> Option<String> {
        self.provider.claims().and_then(|claims| claims.email)
    }

    pub fn full_name(&self) -> Option<String> {
        self.provider.claims().and_then(|claims| claims.full_name())
    }

    fn log_roles(&self, context: &str) {
        let claims = self.provider.claims();
        let realm_roles = claims
            .as_ref()
            .map(|c| c.realm_roles().to_vec())
            .unwrap_or_default();
        let client_roles = claims
            .as_ref()
            .map(|c| c.client_roles(&self.config.client_id).to_vec())
            .unwrap_or_default();
        info!(
            context = context,
            authenticated = self.provider.is_authenticated(),
            realm = %self.config.realm_name,
            client_id = %self.config.client_id,
            required_role = %self.config.required_role,
            ?realm_roles,
            ?client_roles,
            "ロール情報"
        );
    }
}
