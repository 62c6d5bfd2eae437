#![allow(dead_code)]

use app::{Activation, AppContext, NavigationHistory, RecordingDialogs, Router};
use async_trait::async_trait;
use infrastructure::InMemoryApi;
use shared::{AppError, AuthService, Claims, Config, IdentityProvider, RoleAccess, StaticTokenProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// デモデータ入りのインメモリAPIと記録用のダイアログ・ナビゲーター
pub struct Harness {
    pub api: Arc<InMemoryApi>,
    pub dialogs: Arc<RecordingDialogs>,
    pub navigation: Arc<NavigationHistory>,
    pub router: Router,
}

impl Harness {
    /// 開発環境（ガードは常に許可）
    pub fn new() -> Self {
        Self::with_auth(AuthService::new(
            Arc::new(StaticTokenProvider::anonymous()),
            Config::development(),
        ))
    }

    pub fn with_auth(auth: AuthService) -> Self {
        let api = Arc::new(InMemoryApi::with_demo_data());
        let dialogs = Arc::new(RecordingDialogs::new());
        let navigation = Arc::new(NavigationHistory::new());
        let ctx = AppContext::new(api.clone(), auth, dialogs.clone(), navigation.clone());
        Self {
            api,
            dialogs,
            navigation,
            router: Router::new(ctx),
        }
    }

    pub fn ctx(&self) -> AppContext {
        self.router.context().clone()
    }

    pub async fn open(&self, url: &str) -> Activation {
        self.router.navigate(url).await
    }

    pub fn last_dialog_title(&self) -> Option<String> {
        self.dialogs.last_status().map(|dialog| dialog.title)
    }
}

/// 認証状態とロールを固定したIDプロバイダー
pub struct FixedProvider {
    pub authenticated: bool,
    pub roles: Vec<String>,
}

#[async_trait]
impl IdentityProvider for FixedProvider {
    async fn init(&self) -> Result<bool, AppError> {
        Ok(self.authenticated)
    }
    async fn login(&self, _redirect_uri: &str) -> Result<(), AppError> {
        Ok(())
    }
    async fn logout(&self) -> Result<(), AppError> {
        Ok(())
    }
    async fn update_token(&self, _min_validity: Duration) -> Result<bool, AppError> {
        Ok(false)
    }
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
    fn is_token_expired(&self) -> bool {
        false
    }
    fn token(&self) -> Option<String> {
        self.authenticated.then(|| "token".to_string())
    }
    fn claims(&self) -> Option<Claims> {
        if !self.authenticated {
            return None;
        }
        Some(Claims {
            sub: "anna".to_string(),
            email: Some("anna@studyconnect.dev".to_string()),
            name: None,
            given_name: Some("Anna".to_string()),
            family_name: Some("Schmidt".to_string()),
            exp: i64::MAX,
            iat: None,
            realm_access: Some(RoleAccess {
                roles: self.roles.clone(),
            }),
            resource_access: HashMap::new(),
        })
    }
}

pub fn production_auth(authenticated: bool, roles: &[&str]) -> AuthService {
    let provider = FixedProvider {
        authenticated,
        roles: roles.iter().map(|role| role.to_string()).collect(),
    };
    AuthService::new(Arc::new(provider), Config::production())
}
