//! 分類器の抽象
//!
//! レジストリが保持し、推論エンジンが呼び出す作物別の学習済みモデルです。
//! 実体はBurnのCNN（`BurnClassifier`）ですが、テストでは固定の確率を返す
//! スタブを差し込めます。

use crate::crop::CropType;
use crate::error::Result;
use crate::ml::preprocess::ImageTensor;

/// 作物別の学習済み分類器
pub trait Classifier: Send + Sync {
    /// 対象の作物
    fn crop(&self) -> CropType;

    /// 期待する入力形状 [1, H, W, 3]
    fn input_shape(&self) -> [usize; 4];

    /// 出力ベクトルの長さ
    fn num_classes(&self) -> usize;

    /// 順伝播してクラスごとの確率を返す
    fn predict_proba(&self, tensor: &ImageTensor) -> Result<Vec<f32>>;
}

impl std::fmt::Debug for dyn Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("crop", &self.crop())
            .field("input_shape", &self.input_shape())
            .field("num_classes", &self.num_classes())
            .finish()
    }
}
