//! 作物ごとのクラスラベル一覧
//!
//! 並び順は各分類器の出力ベクトルの並びと一致していなければなりません。
//! 文字列は学習データのディレクトリ名そのままです（綴りの揺れも含む）。

use crate::crop::CropType;

/// リンゴ
pub const APPLE_LABELS: [&str; 4] = [
    "Apple_BlackRot",
    "Apple_Healthy",
    "Apple_Scab",
    "Apple_Cedar_apple_rust",
];

/// トウモロコシ
pub const CORN_LABELS: [&str; 4] = [
    "Corn_(maize)_Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)Common_rust",
    "Corn_(maize)Northern_Leaf_Blight",
    "Corn_(maize)_healthy",
];

/// サクランボ
pub const CHERRY_LABELS: [&str; 2] = [
    "Cherry_(including_sour)_Powdery_mildew",
    "Cherry_(including_sour)_healthy",
];

/// ブドウ
pub const GRAPE_LABELS: [&str; 4] = [
    "Grape_Black_rot",
    "Grape_Esca(Black_Measels)",
    "Grape_leaf_blight(Isariopsis_leaf_spot)",
    "Grape_healthy",
];

/// トマト
pub const TOMATO_LABELS: [&str; 10] = [
    "Tomato__Bacterial_spot",
    "Tomato_Early_blight",
    "Tomato_healthy",
    "Tomato_Late_blight",
    "Tomato_Leaf_Mold",
    "Tomato_Septoria_leaf_spot",
    "Tomato_Spider_mites Two-spotted_spider_mite",
    "Tomato_Target_Spot",
    "Tomato__Tomato_mosaic_virus",
    "Tomato_Tomato_Yellow_Leaf_Curl_Virus",
];

/// 作物のラベル一覧を取得
pub fn labels_for(crop: CropType) -> &'static [&'static str] {
    match crop {
        CropType::Apple => &APPLE_LABELS,
        CropType::Corn => &CORN_LABELS,
        CropType::Cherry => &CHERRY_LABELS,
        CropType::Grape => &GRAPE_LABELS,
        CropType::Tomato => &TOMATO_LABELS,
    }
}

/// クラスインデックスからラベルを取得
pub fn class_index_to_label(crop: CropType, index: usize) -> Option<&'static str> {
    labels_for(crop).get(index).copied()
}

/// ラベルからクラスインデックスを取得
pub fn label_to_class_index(crop: CropType, label: &str) -> Option<usize> {
    labels_for(crop).iter().position(|l| *l == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_crop_has_labels() {
        for crop in CropType::ALL {
            assert!(!labels_for(crop).is_empty(), "{crop} has no labels");
        }
        assert_eq!(labels_for(CropType::Tomato).len(), 10);
        assert_eq!(labels_for(CropType::Cherry).len(), 2);
    }

    #[test]
    fn test_index_lookup() {
        assert_eq!(class_index_to_label(CropType::Tomato, 2), Some("Tomato_healthy"));
        assert_eq!(class_index_to_label(CropType::Apple, 4), None);
        assert_eq!(label_to_class_index(CropType::Corn, "Corn_(maize)_healthy"), Some(3));
        assert_eq!(label_to_class_index(CropType::Corn, "Tomato_healthy"), None);
    }

    #[test]
    fn test_labels_are_unique_per_crop() {
        for crop in CropType::ALL {
            let labels = labels_for(crop);
            for (i, label) in labels.iter().enumerate() {
                assert_eq!(labels.iter().position(|l| l == label), Some(i));
            }
        }
    }
}
