//! 画像前処理
//!
//! アップロードされた生バイト列を分類器入力用の固定サイズテンソルに変換します。
//!
//! - 対応形式: JPEG / PNG（マジックバイトで判定し、デコード前に弾く）
//! - 色チャンネルはRGBに統一（アルファは破棄、グレースケールは3チャンネルへ展開）
//! - アスペクト比は無視して目標サイズへ引き伸ばす（全作物共通）
//! - 補間は `FilterType::Triangle`（縮小時はアンチエイリアスがかかるため、
//!   OpenCVの `INTER_LINEAR` とは画素値が一致しない）
//! - 画素値は 0..=255 を 255 で割って [0, 1] に収める
//! - 出力は (1, H, W, 3) のNHWC配置

use image::{imageops::FilterType, ImageFormat};
use tracing::debug;

use crate::error::{PredictError, Result};

/// 既定の入力幅（学習時と同じ）
pub const DEFAULT_IMAGE_WIDTH: u32 = 180;

/// 既定の入力高さ（学習時と同じ）
pub const DEFAULT_IMAGE_HEIGHT: u32 = 180;

/// 受け付ける画像形式
pub const SUPPORTED_FORMATS: [ImageFormat; 2] = [ImageFormat::Jpeg, ImageFormat::Png];

/// 分類器に渡す単一画像バッチ
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    /// [バッチ, 高さ, 幅, チャンネル]
    pub shape: [usize; 4],
    /// NHWC順で平坦化した画素値
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn height(&self) -> usize {
        self.shape[1]
    }

    pub fn width(&self) -> usize {
        self.shape[2]
    }

    /// 形状と要素数が整合しているか
    pub fn is_consistent(&self) -> bool {
        self.shape.iter().product::<usize>() == self.data.len()
    }
}

/// 画像前処理器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePreprocessor {
    pub width: u32,
    pub height: u32,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT)
    }
}

impl ImagePreprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 出力テンソルの形状
    pub fn output_shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, 3]
    }

    /// 生バイト列をテンソルへ変換
    pub fn preprocess(&self, raw_bytes: &[u8]) -> Result<ImageTensor> {
        if raw_bytes.is_empty() {
            return Err(PredictError::InvalidImage("empty payload".to_string()));
        }

        let format = image::guess_format(raw_bytes)
            .map_err(|_| PredictError::InvalidImage("unrecognized image format".to_string()))?;
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(PredictError::InvalidImage(format!(
                "unsupported image format: {:?}",
                format
            )));
        }

        let decoded = image::load_from_memory_with_format(raw_bytes, format)
            .map_err(|e| PredictError::InvalidImage(format!("failed to decode image: {}", e)))?;
        let (source_width, source_height) = (decoded.width(), decoded.height());

        let rgb = decoded.to_rgb8();
        let resized = image::imageops::resize(&rgb, self.width, self.height, FilterType::Triangle);

        let data: Vec<f32> = resized
            .into_raw()
            .into_iter()
            .map(|value| value as f32 / 255.0)
            .collect();

        debug!(
            ?format,
            source_width,
            source_height,
            target_width = self.width,
            target_height = self.height,
            "preprocessed image"
        );

        Ok(ImageTensor {
            shape: self.output_shape(),
            data,
        })
    }
}
