//! 予測オーケストレータ
//!
//! 作物種別の検証 → 分類器の取得 → 画像前処理 → 推論 → 知識ベース参照、の順に
//! 処理して診断結果を返します。途中で失敗した場合は発生したエラーをそのまま返し、
//! 部分的な結果は返しません。
//!
//! ファイルの保存・削除や結果の永続化は呼び出し側の責務です。

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::catalog::{lookup, Solution};
use crate::crop::CropType;
use crate::error::Result;
use crate::ml::{ImagePreprocessor, InferenceEngine};
use crate::model::{AppConfig, BurnModelLoader, ModelRegistry, ModelRoutes};

/// 診断結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// 予測された病害ラベル
    pub disease: String,
    /// 対処法（知識ベースに無ければ `NoInformation`）
    pub solution: Solution,
    /// 予測クラスの確率（出力JSONには含めない）
    #[serde(skip)]
    pub confidence: f32,
}

/// 予測オーケストレータ
pub struct Predictor {
    registry: Arc<ModelRegistry>,
    preprocessor: ImagePreprocessor,
}

impl Predictor {
    pub fn new(registry: Arc<ModelRegistry>, preprocessor: ImagePreprocessor) -> Self {
        Self {
            registry,
            preprocessor,
        }
    }

    /// 設定からレジストリを組み立てる（`preload` 指定時は全モデルを読み込む）
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let routes = ModelRoutes::from_settings(&config.models)?;
        let preprocessor = config.image.preprocessor();
        let loader = BurnModelLoader::new(
            config.device_type,
            (preprocessor.width, preprocessor.height),
        );
        let registry = Arc::new(ModelRegistry::new(routes, loader));

        if config.models.preload {
            registry
                .preload_all()
                .context("Failed to preload models")?;
            info!("preloaded models for all crops");
        }

        Ok(Self::new(registry, preprocessor))
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn preprocessor(&self) -> &ImagePreprocessor {
        &self.preprocessor
    }

    /// 作物種別の文字列と画像バイト列から診断する
    pub fn predict(&self, crop_type: &str, raw_bytes: &[u8]) -> Result<PredictionResult> {
        let crop = crop_type.parse::<CropType>().inspect_err(|_| {
            warn!(crop_type, "rejected unsupported crop type");
        })?;
        self.predict_crop(crop, raw_bytes)
    }

    /// 作物種別が確定している場合の診断
    pub fn predict_crop(&self, crop: CropType, raw_bytes: &[u8]) -> Result<PredictionResult> {
        let _span = info_span!("predict", %crop, bytes = raw_bytes.len()).entered();

        let classifier = self.registry.get_classifier(crop)?;
        let tensor = self.preprocessor.preprocess(raw_bytes)?;
        let classification = InferenceEngine::classify(classifier.as_ref(), &tensor)?;

        let solution = lookup(&classification.label);
        if !solution.is_available() {
            warn!(label = %classification.label, "no knowledge base entry for label");
        }

        info!(
            disease = %classification.label,
            confidence = classification.confidence,
            "prediction complete"
        );

        Ok(PredictionResult {
            disease: classification.label,
            solution,
            confidence: classification.confidence,
        })
    }
}
