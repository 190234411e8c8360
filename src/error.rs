//! 予測パイプラインのエラー型
//!
//! 各エラーは発生箇所で生成され、オーケストレータの上位までそのまま伝播します。
//! 知識ベースに項目が無いことはエラーではありません（`Solution::NoInformation`）。

use thiserror::Error;

use crate::crop::CropType;

/// 予測処理で発生し得るエラー
#[derive(Error, Debug)]
pub enum PredictError {
    /// 対応していない作物種別
    #[error("unsupported crop type: '{0}'")]
    UnsupportedCrop(String),

    /// モデルアーティファクトの読み込み失敗（ファイル欠落・破損・形状不一致）
    #[error("failed to load model for {crop}: {reason}")]
    ModelLoad { crop: CropType, reason: String },

    /// 画像としてデコードできない入力
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// 順伝播の失敗
    #[error("inference failed: {0}")]
    Inference(String),

    /// 出力インデックスに対応するラベルが無い（分類器とラベル一覧の不整合）
    #[error("no label at index {index} for {crop} ({num_labels} labels configured)")]
    LabelMapping {
        crop: CropType,
        index: usize,
        num_labels: usize,
    },
}

/// エラー種別（呼び出し側での分岐用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedCrop,
    ModelLoad,
    InvalidImage,
    Inference,
    LabelMapping,
}

impl PredictError {
    pub fn model_load(crop: CropType, reason: impl std::fmt::Display) -> Self {
        PredictError::ModelLoad {
            crop,
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::UnsupportedCrop(_) => ErrorKind::UnsupportedCrop,
            PredictError::ModelLoad { .. } => ErrorKind::ModelLoad,
            PredictError::InvalidImage(_) => ErrorKind::InvalidImage,
            PredictError::Inference(_) => ErrorKind::Inference,
            PredictError::LabelMapping { .. } => ErrorKind::LabelMapping,
        }
    }

    /// 利用者が入力を直せば解消するエラーかどうか
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnsupportedCrop | ErrorKind::InvalidImage
        )
    }

    /// HTTP層で返すステータスコード
    pub fn status_code(&self) -> u16 {
        if self.is_user_error() {
            400
        } else {
            500
        }
    }
}

/// 予測パイプライン用のResult
pub type Result<T> = std::result::Result<T, PredictError>;
