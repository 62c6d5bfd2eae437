//! `studyconnect <path> [--offline]`
//!
//! 指定したパスへ遷移し、有効化されたルートと取得データをJSONで出力する。

use anyhow::{bail, Context};
use app::{AppContext, NavigationHistory, RecordingDialogs, Router};
use infrastructure::{HttpApiClient, InMemoryApi, StudyConnectApi};
use shared::{init_tracing, AuthService, Config, StaticTokenProvider, ToastService};
use std::sync::Arc;
use tracing::{info, warn};

struct Args {
    path: String,
    offline: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut path = None;
    let mut offline = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--offline" => offline = true,
            _ if path.is_none() => path = Some(arg),
            _ => bail!("unexpected argument: {arg}"),
        }
    }
    Ok(Args {
        path: path.unwrap_or_else(|| "/".to_string()),
        offline,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = init_tracing() {
        eprintln!("トレーシング初期化エラー: {e}");
    }

    let args = parse_args()?;
    let config = Config::from_env().context("設定の読み込みに失敗")?;
    let provider = StaticTokenProvider::from_env().context("アクセストークンが不正")?;
    let auth = AuthService::new(Arc::new(provider), config.clone());
    if !auth.init().await {
        warn!("IDプロバイダーを初期化できないまま続行します");
    }

    let api: Arc<dyn StudyConnectApi> = if args.offline {
        info!("インメモリAPIで起動");
        Arc::new(InMemoryApi::with_demo_data())
    } else {
        Arc::new(
            HttpApiClient::new(&config, auth.clone(), ToastService::global())
                .context("HTTPクライアントの作成に失敗")?,
        )
    };

    let navigation = Arc::new(NavigationHistory::new());
    let ctx = AppContext::new(api, auth, Arc::new(RecordingDialogs::new()), navigation.clone());
    let router = Router::new(ctx);

    let activation = router.navigate(&args.path).await;
    if activation.was_redirected() {
        info!(
            "リダイレクトされました: requested={}, path={}, history={:?}",
            activation.requested,
            activation.path,
            navigation.entries()
        );
    }
    println!("{}", serde_json::to_string_pretty(&activation)?);

    Ok(())
}
