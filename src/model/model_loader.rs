//! モデルアーティファクトの読み込み
//!
//! tar.gzを展開してメタデータを照合し、重みを復元して分類器を作ります。
//! 照合に失敗した場合はすべて `ModelLoad` エラーになります。

use std::path::Path;
use std::sync::Arc;

use burn::backend::NdArray;
use tracing::info;

use crate::catalog::labels_for;
use crate::crop::CropType;
use crate::error::{PredictError, Result};
use crate::ml::{BurnClassifier, Classifier};
use crate::model::config::DeviceType;
use crate::model::model_metadata::ModelMetadata;
use crate::model::model_storage::load_model_with_metadata;

/// 作物のモデルを読み込む
pub trait ModelLoader: Send + Sync {
    fn load(&self, crop: CropType, path: &Path) -> Result<Arc<dyn Classifier>>;
}

/// メタデータが作物・ラベル一覧・入力サイズと一致するか確認
pub fn validate_metadata(
    crop: CropType,
    metadata: &ModelMetadata,
    input_size: (u32, u32),
) -> Result<()> {
    if metadata.crop != crop {
        return Err(PredictError::model_load(
            crop,
            format!("artifact was exported for {}", metadata.crop),
        ));
    }

    let expected = labels_for(crop);
    if metadata.class_labels.len() != expected.len() {
        return Err(PredictError::model_load(
            crop,
            format!(
                "artifact has {} classes but {} labels are configured",
                metadata.class_labels.len(),
                expected.len()
            ),
        ));
    }
    if let Some(index) = (0..expected.len()).find(|&i| metadata.class_labels[i] != expected[i]) {
        return Err(PredictError::model_load(
            crop,
            format!(
                "label {} is '{}' in the artifact but '{}' in the catalog",
                index, metadata.class_labels[index], expected[index]
            ),
        ));
    }

    let (width, height) = input_size;
    if (metadata.image_width, metadata.image_height) != (width, height) {
        return Err(PredictError::model_load(
            crop,
            format!(
                "artifact expects {}x{} input but images are resized to {}x{}",
                metadata.image_width, metadata.image_height, width, height
            ),
        ));
    }

    Ok(())
}

/// Burnの重みを読み込むローダー
#[derive(Debug, Clone, Copy)]
pub struct BurnModelLoader {
    pub device_type: DeviceType,
    /// 前処理後の画像サイズ (幅, 高さ)
    pub input_size: (u32, u32),
}

impl BurnModelLoader {
    pub fn new(device_type: DeviceType, input_size: (u32, u32)) -> Self {
        Self {
            device_type,
            input_size,
        }
    }
}

impl ModelLoader for BurnModelLoader {
    fn load(&self, crop: CropType, path: &Path) -> Result<Arc<dyn Classifier>> {
        if !path.is_file() {
            return Err(PredictError::model_load(
                crop,
                format!("artifact not found: {}", path.display()),
            ));
        }

        let (metadata, model_binary) =
            load_model_with_metadata(path).map_err(|e| PredictError::model_load(crop, format!("{:#}", e)))?;
        validate_metadata(crop, &metadata, self.input_size)?;

        let config = metadata.model_config();
        let classifier: Arc<dyn Classifier> = match self.device_type {
            DeviceType::Cpu => Arc::new(BurnClassifier::<NdArray>::from_record_bytes(
                crop,
                &config,
                self.input_size,
                model_binary,
                Default::default(),
            )?),
            #[cfg(feature = "wgpu")]
            DeviceType::Wgpu => Arc::new(BurnClassifier::<burn::backend::Wgpu>::from_record_bytes(
                crop,
                &config,
                self.input_size,
                model_binary,
                Default::default(),
            )?),
            #[cfg(not(feature = "wgpu"))]
            DeviceType::Wgpu => {
                return Err(PredictError::model_load(
                    crop,
                    "built without the `wgpu` feature",
                ))
            }
        };

        info!(
            %crop,
            path = %path.display(),
            device = %self.device_type,
            classes = metadata.num_classes(),
            "loaded model"
        );
        Ok(classifier)
    }
}
