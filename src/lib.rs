//! 作物の葉の画像から病害を判定し、対処法を添えて返すライブラリ
//!
//! 処理の流れ: 作物種別の検証 → モデルレジストリ → 画像前処理 → 推論 → 知識ベース

pub mod crop;
pub mod error;
pub mod catalog;
pub mod ml;
pub mod model;
pub mod logging;
pub mod predictor;

pub use crop::CropType;
pub use error::{ErrorKind, PredictError, Result};
pub use catalog::{lookup, Solution};
pub use ml::{Classifier, ImagePreprocessor, ImageTensor, InferenceEngine};
pub use model::{AppConfig, BurnModelLoader, ModelLoader, ModelRegistry, ModelRoutes};
pub use predictor::{PredictionResult, Predictor};
