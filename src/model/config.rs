//! アプリケーション設定管理モジュール
//!
//! 計算デバイス、モデルファイルの場所、入力画像サイズ、ログ設定を
//! JSON形式で保存・読み込みします。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::crop::CropType;
use crate::ml::{ImagePreprocessor, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH};

/// 計算デバイスの種類
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DeviceType {
    /// NdArray (CPU) バックエンド
    #[default]
    Cpu,
    /// WGPU (GPU) バックエンド（`wgpu` フィーチャー有効時のみ）
    Wgpu,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Wgpu => write!(f, "WGPU (GPU)"),
            DeviceType::Cpu => write!(f, "CPU (NdArray)"),
        }
    }
}

/// モデル設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// モデルファイルを置くディレクトリ
    pub model_dir: String,
    /// 作物ごとのパス指定（未指定なら `<model_dir>/<crop>_model.tar.gz`）
    #[serde(default)]
    pub paths: BTreeMap<CropType, String>,
    /// 起動時に全作物のモデルを読み込むか
    #[serde(default)]
    pub preload: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_dir: "models".to_string(),
            paths: BTreeMap::new(),
            preload: false,
        }
    }
}

impl ModelSettings {
    /// 作物のモデルファイルのパス
    pub fn path_for(&self, crop: CropType) -> PathBuf {
        match self.paths.get(&crop) {
            Some(path) => PathBuf::from(path),
            None => Path::new(&self.model_dir).join(format!("{}_model.tar.gz", crop)),
        }
    }
}

/// 入力画像設定
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
        }
    }
}

impl ImageSettings {
    pub fn preprocessor(&self) -> ImagePreprocessor {
        ImagePreprocessor::new(self.width, self.height)
    }
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// trace / debug / info / warn / error
    pub level: String,
    /// ANSIカラーを使うか
    #[serde(default = "default_true")]
    pub ansi: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 計算デバイスの種類
    #[serde(default)]
    pub device_type: DeviceType,
    /// モデル設定
    #[serde(default)]
    pub models: ModelSettings,
    /// 入力画像設定
    #[serde(default)]
    pub image: ImageSettings,
    /// ログ設定
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// 設定ファイルのデフォルトパス
    pub fn default_path() -> PathBuf {
        PathBuf::from("config.json")
    }

    /// 設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 設定を読み込む、存在しないか壊れている場合はデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::load(path) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                    Self::default()
                }
            }
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        }
    }

    /// 設定を保存する
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 計算デバイスを設定
    pub fn set_device_type(&mut self, device_type: DeviceType) {
        self.device_type = device_type;
    }

    /// 作物のモデルパスを設定
    pub fn set_model_path(&mut self, crop: CropType, path: String) {
        self.models.paths.insert(crop, path);
    }
}
