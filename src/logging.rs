//! ログ出力の初期化
//!
//! 標準出力はJSON結果専用なので、ログは標準エラーに出す。

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` があればそれを使い、なければ info（`verbose` なら debug）
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
