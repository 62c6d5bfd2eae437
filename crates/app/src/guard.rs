use crate::routes::Route;
use shared::AuthService;
use tracing::{debug, warn};

/// ガードの判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Route),
}

/// ルート遷移の可否を判定する
///
/// 開発環境では常に許可。本番環境では認証済みかつ必要ロールを持つ場合のみ許可し、
/// 未認証なら `/unauthorized?returnUrl=...`、ロール不足なら `/not-allowed` へ。
pub fn can_activate(auth: &AuthService, attempted_url: &str) -> GuardOutcome {
    if !auth.config().is_production() {
        debug!("開発環境のためガードを通過: url={}", attempted_url);
        return GuardOutcome::Allow;
    }

    let is_authenticated = auth.is_authenticated();
    let has_required_role = auth.has_required_role();
    if is_authenticated && has_required_role {
        return GuardOutcome::Allow;
    }

    if !is_authenticated {
        warn!("未認証のためリダイレクト: url={}", attempted_url);
        return GuardOutcome::Redirect(Route::Unauthorized {
            return_url: Some(attempted_url.to_string()),
        });
    }

    warn!(
        "必要なロールがありません: url={}, required_role={}",
        attempted_url,
        auth.config().required_role
    );
    GuardOutcome::Redirect(Route::NotAllowed)
}
