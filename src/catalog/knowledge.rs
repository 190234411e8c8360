//! 病害知識ベース
//!
//! ラベル文字列から予防策・治療薬のテキストを引く静的テーブルです。
//! すべてのラベルを網羅しているわけではなく、未登録のラベルには
//! `Solution::NoInformation` を返します。

use serde::ser::{Serialize, SerializeMap, Serializer};

/// 情報が無い場合に返す文言
pub const NO_INFORMATION: &str = "No information available for this disease.";

/// 知識ベースの1項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiseaseInfo {
    pub label: &'static str,
    pub preventive_measures: &'static str,
    pub medications: &'static str,
}

const fn entry(
    label: &'static str,
    preventive_measures: &'static str,
    medications: &'static str,
) -> DiseaseInfo {
    DiseaseInfo {
        label,
        preventive_measures,
        medications,
    }
}

/// 登録済みの病害情報
pub const DISEASE_INFO: [DiseaseInfo; 18] = [
    entry(
        "Corn_(maize)_Cercospora_leaf_spot Gray_leaf_spot",
        "Practice crop rotation and use resistant varieties. Ensure good field drainage.",
        "Apply fungicides like chlorothalonil or azoxystrobin to manage symptoms.",
    ),
    entry(
        "Corn_(maize)Common_rust",
        "Use resistant varieties and practice crop rotation. Avoid planting in the same field year after year.",
        "Fungicides such as propiconazole or tebuconazole can help control rust.",
    ),
    entry(
        "Corn_(maize)Northern_Leaf_Blight",
        "Practice crop rotation and remove infected plant debris. Ensure good air circulation.",
        "Apply fungicides like mancozeb or pyraclostrobin to control the disease.",
    ),
    entry(
        "Corn_(maize)_healthy",
        "Maintain good field management practices including proper irrigation and pest control.",
        "No action needed.",
    ),
    entry(
        "Apple_Scab",
        "Rake and destroy fallen leaves, and prune the tree to promote airflow.",
        "Apply fungicides such as captan or mancozeb at regular intervals.",
    ),
    entry(
        "Apple_BlackRot",
        "Remove infected fruit and prune dead or cankered limbs. Avoid injuries to the tree.",
        "Fungicides like benomyl or thiophanate-methyl can be used to treat infections.",
    ),
    entry(
        "Apple_Cedar_apple_rust",
        "Remove nearby juniper trees, which host the rust, and ensure proper tree spacing.",
        "Use fungicides such as myclobutanil to control the disease.",
    ),
    entry(
        "Apple_Healthy",
        "Maintain regular tree inspections, proper pruning, and good irrigation practices.",
        "No action needed.",
    ),
    entry(
        "Cherry_(including_sour)_Powdery_mildew",
        "Ensure good air circulation and avoid overhead watering. Remove and destroy infected plant parts.",
        "Apply fungicides such as sulfur or potassium bicarbonate to control the spread.",
    ),
    entry(
        "Cherry_(including_sour)_healthy",
        "Maintain proper orchard management practices including regular inspections and balanced fertilization.",
        "No action needed.",
    ),
    entry(
        "Grape_Black_rot",
        "Prune vines to improve airflow and remove diseased plant debris. Rotate crops regularly.",
        "Apply fungicides such as mancozeb or captan to control the spread.",
    ),
    entry(
        "Grape_Esca(Black_Measels)",
        "Avoid injuries to vines during pruning and limit water stress.",
        "There are no effective chemical treatments for Esca. Manage the disease through good viticultural practices.",
    ),
    entry(
        "Grape_leaf_blight(Isariopsis_leaf_spot)",
        "Improve air circulation by pruning and avoid overwatering. Remove infected leaves.",
        "Fungicide applications, such as copper-based products, may help.",
    ),
    entry(
        "Grape_healthy",
        "Maintain regular inspection of plants and ensure proper irrigation practices.",
        "No action needed.",
    ),
    entry(
        "Tomato_Bacterial_spot",
        "Use disease-free seeds and resistant varieties. Avoid overhead irrigation and practice crop rotation.",
        "Apply copper-based fungicides to control the spread of the disease.",
    ),
    entry(
        "Tomato_Early_blight",
        "Practice crop rotation and use resistant varieties. Remove infected plant debris.",
        "Fungicides like mancozeb or chlorothalonil can help manage symptoms.",
    ),
    entry(
        "Tomato_Tomato_mosaic_virus",
        "Use virus-free seeds and practice good sanitation. Remove and destroy infected plants.",
        "No chemical treatment available; focus on prevention and control of aphid populations.",
    ),
    entry(
        "Tomato_healthy",
        "Maintain good field management practices, proper irrigation, and pest control.",
        "No action needed.",
    ),
];

/// 診断結果に添える対処法
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// 予防策と治療薬
    Remedy {
        preventive_measures: String,
        medications: String,
    },
    /// 知識ベースに項目が無い
    NoInformation,
}

impl Solution {
    pub fn is_available(&self) -> bool {
        matches!(self, Solution::Remedy { .. })
    }
}

impl From<&DiseaseInfo> for Solution {
    fn from(info: &DiseaseInfo) -> Self {
        Solution::Remedy {
            preventive_measures: info.preventive_measures.to_string(),
            medications: info.medications.to_string(),
        }
    }
}

/// `{"Preventive Measures": .., "Medications": ..}` もしくは文言のみの文字列として出力
impl Serialize for Solution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Solution::Remedy {
                preventive_measures,
                medications,
            } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("Preventive Measures", preventive_measures)?;
                map.serialize_entry("Medications", medications)?;
                map.end()
            }
            Solution::NoInformation => serializer.serialize_str(NO_INFORMATION),
        }
    }
}

/// ラベルに対応する病害情報の参照
pub fn find(label: &str) -> Option<&'static DiseaseInfo> {
    DISEASE_INFO.iter().find(|info| info.label == label)
}

/// ラベルから対処法を引く（未登録なら `NoInformation`）
pub fn lookup(label: &str) -> Solution {
    find(label).map(Solution::from).unwrap_or(Solution::NoInformation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::labels_for;
    use crate::crop::CropType;

    #[test]
    fn test_lookup_registered_label() {
        let solution = lookup("Tomato_healthy");
        assert_eq!(
            solution,
            Solution::Remedy {
                preventive_measures:
                    "Maintain good field management practices, proper irrigation, and pest control."
                        .to_string(),
                medications: "No action needed.".to_string(),
            }
        );
        assert!(solution.is_available());
    }

    #[test]
    fn test_lookup_missing_label() {
        assert_eq!(lookup("Tomato_Leaf_Mold"), Solution::NoInformation);
        assert_eq!(lookup(""), Solution::NoInformation);
        assert_eq!(lookup("banana"), Solution::NoInformation);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        // カタログ側の綴り（アンダースコア2つ）は知識ベースに無い
        assert_eq!(lookup("Tomato__Bacterial_spot"), Solution::NoInformation);
        assert!(lookup("Tomato_Bacterial_spot").is_available());
        assert_eq!(lookup("tomato_healthy"), Solution::NoInformation);
    }

    #[test]
    fn test_all_non_tomato_labels_have_entries() {
        for crop in [CropType::Apple, CropType::Corn, CropType::Cherry, CropType::Grape] {
            for label in labels_for(crop) {
                assert!(find(label).is_some(), "missing entry for {label}");
            }
        }
    }

    #[test]
    fn test_serialize_remedy() {
        let json = serde_json::to_value(lookup("Grape_healthy")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Preventive Measures": "Maintain regular inspection of plants and ensure proper irrigation practices.",
                "Medications": "No action needed."
            })
        );
    }

    #[test]
    fn test_serialize_no_information() {
        let json = serde_json::to_value(Solution::NoInformation).unwrap();
        assert_eq!(json, serde_json::json!("No information available for this disease."));
    }
}
