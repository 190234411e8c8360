//! モデルメタデータの定義と永続化
//!
//! tar.gz形式のモデルアーティファクトに同梱される情報です。
//! 読み込み時にラベル一覧・入力サイズを照合し、分類器と設定の不整合を
//! 起動時（初回読み込み時）に検出します。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::crop::CropType;
use crate::ml::LeafModelConfig;

/// モデルメタデータ
///
/// tar.gz形式で保存される情報：
/// - metadata.json: このメタデータ（JSON形式）
/// - model.bin: モデルの重み（バイナリ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// 対象の作物
    pub crop: CropType,

    /// 出力順に並んだクラスラベル
    /// 例: ["Cherry_(including_sour)_Powdery_mildew", "Cherry_(including_sour)_healthy"]
    pub class_labels: Vec<String>,

    /// モデル入力の幅（ピクセル）
    pub image_width: u32,

    /// モデル入力の高さ（ピクセル）
    pub image_height: u32,

    /// 全結合中間層の次元
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,

    /// モデルの書き出し時刻（ISO8601形式）
    pub trained_at: String,
}

fn default_hidden_size() -> usize {
    LeafModelConfig::new(0).hidden_size
}

impl ModelMetadata {
    /// 新しいメタデータを作成
    pub fn new(
        crop: CropType,
        class_labels: Vec<String>,
        image_width: u32,
        image_height: u32,
        hidden_size: usize,
    ) -> Self {
        let trained_at = chrono::Local::now().to_rfc3339();

        Self {
            crop,
            class_labels,
            image_width,
            image_height,
            hidden_size,
            trained_at,
        }
    }

    /// クラス数
    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    /// メタデータに対応するモデル設定
    pub fn model_config(&self) -> LeafModelConfig {
        LeafModelConfig::new(self.num_classes()).with_hidden_size(self.hidden_size)
    }

    /// メタデータをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata to JSON")
    }

    /// JSON文字列からメタデータを生成
    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize metadata from JSON")
    }
}
