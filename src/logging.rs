//! 診断ログ（stderr）
//!
//! 進捗表示は println! で行い、こちらは tracing の出力のみ。
//! `RUST_LOG` があればそれを優先する。

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 二重初期化（テスト等）は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
