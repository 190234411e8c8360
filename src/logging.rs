//! ログ出力の初期化
//!
//! `tracing` のfmtサブスクライバを設定ファイルの内容に従って組み立てます。
//! ライブラリ側はマクロを呼ぶだけで、サブスクライバの設定はバイナリの責務です。

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::model::config::LoggingSettings;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    /// 文字列から解釈（不明な値はInfo）
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    pub level: LogLevel,
    pub ansi_colors: bool,
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            ansi_colors: true,
            include_target: false,
        }
    }
}

impl From<&LoggingSettings> for LogConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: LogLevel::parse(&settings.level),
            ansi_colors: settings.ansi,
            include_target: false,
        }
    }
}

impl LogConfig {
    /// デバッグ用の詳細設定
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            ansi_colors: true,
            include_target: true,
        }
    }
}

/// グローバルサブスクライバを設定する
///
/// ログはstderrへ出力し、stdoutは予測結果のJSON専用にします。
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level.to_tracing_level())
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
