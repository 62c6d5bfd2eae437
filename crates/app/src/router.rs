use crate::context::AppContext;
use crate::guard::{can_activate, GuardOutcome};
use crate::resolvers::{Resolvers, RouteData};
use crate::routes::Route;
use serde::Serialize;
use tracing::{info, warn};

/// 有効化されたルートと取得済みデータ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activation {
    /// 要求されたURL
    pub requested: String,
    pub name: &'static str,
    pub path: String,
    #[serde(skip)]
    pub route: Route,
    pub data: RouteData,
}

impl Activation {
    fn new(requested: &str, route: Route, data: RouteData) -> Self {
        Self {
            requested: requested.to_string(),
            name: route.name(),
            path: route.path(),
            route,
            data,
        }
    }

    pub fn was_redirected(&self) -> bool {
        Route::parse(&self.requested) != self.route
    }
}

/// ルーター → ガード → リゾルバーの順に遷移を処理する
#[derive(Clone)]
pub struct Router {
    ctx: AppContext,
    resolvers: Resolvers,
}

impl Router {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            resolvers: Resolvers::new(ctx.clone()),
            ctx,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub async fn navigate(&self, url: &str) -> Activation {
        let route = Route::parse(url);
        info!("ルート遷移開始: url={}, route={}", url, route.name());

        if route.requires_auth() {
            let outcome = can_activate(&self.ctx.auth, &attempted_url(url));
            if let GuardOutcome::Redirect(target) = outcome {
                self.ctx.navigate(&target.path());
                return Activation::new(url, target, RouteData::default());
            }
        }

        match self.resolvers.resolve(&route).await {
            Some(data) => {
                info!("ルート有効化: path={}", route.path());
                Activation::new(url, route, data)
            }
            None => {
                warn!("データ取得に失敗したため not-found へ: url={}", url);
                Activation::new(url, Route::NotFound, RouteData::default())
            }
        }
    }
}

/// クエリ文字列を含めた遷移先URL（先頭のスラッシュを補う）
fn attempted_url(url: &str) -> String {
    if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{url}")
    }
}
