use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// トレーシングサブスクライバーを初期化
/// `RUST_LOG` が未設定なら info レベル
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // 構造化ログをJSON形式で標準出力へ
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).json())
        .with(filter)
        .try_init()?;

    Ok(())
}
