//! モデル推論機能
//!
//! 分類器の出力確率から最大のクラスを選び、ラベル一覧で名前に変換します。
//! 信頼度による足切りは行わず、最上位のクラスを常に答えとします。

use tracing::{debug, error};

use crate::catalog::labels_for;
use crate::error::{PredictError, Result};
use crate::ml::classifier::Classifier;
use crate::ml::preprocess::ImageTensor;

/// 分類結果
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// 予測クラスのインデックス
    pub index: usize,
    /// 予測クラスのラベル
    pub label: String,
    /// 予測クラスの確率
    pub confidence: f32,
}

/// 最大値のインデックス（同値なら小さいインデックス、NaNは選ばない）
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

/// 推論エンジン
#[derive(Debug, Default, Clone, Copy)]
pub struct InferenceEngine;

impl InferenceEngine {
    /// 分類器の作物のラベル一覧を使って分類
    pub fn classify(classifier: &dyn Classifier, tensor: &ImageTensor) -> Result<Classification> {
        Self::classify_with_labels(classifier, tensor, labels_for(classifier.crop()))
    }

    /// 任意のラベル一覧を使って分類
    pub fn classify_with_labels(
        classifier: &dyn Classifier,
        tensor: &ImageTensor,
        labels: &[&str],
    ) -> Result<Classification> {
        let crop = classifier.crop();
        let probabilities = classifier.predict_proba(tensor)?;

        let index = argmax(&probabilities).ok_or_else(|| {
            PredictError::Inference(format!(
                "classifier for {} produced no usable output ({} values)",
                crop,
                probabilities.len()
            ))
        })?;

        let label = labels.get(index).ok_or_else(|| {
            error!(%crop, index, num_labels = labels.len(), "classifier output has no matching label");
            PredictError::LabelMapping {
                crop,
                index,
                num_labels: labels.len(),
            }
        })?;

        let confidence = probabilities[index];
        debug!(%crop, index, label, confidence, "classified image");

        Ok(Classification {
            index,
            label: label.to_string(),
            confidence,
        })
    }
}
