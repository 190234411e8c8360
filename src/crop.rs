//! 作物種別の定義
//!
//! 分類器・ラベル一覧・モデルファイルのすべてがこの列挙型をキーに引かれます。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PredictError;

/// 対応している作物の種類（閉じた集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Apple,
    Corn,
    Cherry,
    Grape,
    Tomato,
}

impl CropType {
    /// すべての作物種別（レジストリのスロット順）
    pub const ALL: [CropType; 5] = [
        CropType::Apple,
        CropType::Corn,
        CropType::Cherry,
        CropType::Grape,
        CropType::Tomato,
    ];

    /// 小文字の識別子
    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Apple => "apple",
            CropType::Corn => "corn",
            CropType::Cherry => "cherry",
            CropType::Grape => "grape",
            CropType::Tomato => "tomato",
        }
    }

    /// `ALL` 内での位置
    pub fn index(&self) -> usize {
        match self {
            CropType::Apple => 0,
            CropType::Corn => 1,
            CropType::Cherry => 2,
            CropType::Grape => 3,
            CropType::Tomato => 4,
        }
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropType {
    type Err = PredictError;

    /// 前後の空白を除き、大文字小文字を区別せずに解釈する
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        CropType::ALL
            .into_iter()
            .find(|crop| crop.as_str() == normalized)
            .ok_or_else(|| PredictError::UnsupportedCrop(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_crops() {
        for crop in CropType::ALL {
            assert_eq!(crop.as_str().parse::<CropType>().unwrap(), crop);
        }
        assert_eq!(" Tomato\n".parse::<CropType>().unwrap(), CropType::Tomato);
    }

    #[test]
    fn test_parse_unknown_crop() {
        let err = "banana".parse::<CropType>().unwrap_err();
        assert!(matches!(err, PredictError::UnsupportedCrop(ref name) if name == "banana"));
        assert!("".parse::<CropType>().is_err());
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, crop) in CropType::ALL.iter().enumerate() {
            assert_eq!(crop.index(), i);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&CropType::Cherry).unwrap();
        assert_eq!(json, "\"cherry\"");
        let crop: CropType = serde_json::from_str("\"grape\"").unwrap();
        assert_eq!(crop, CropType::Grape);
    }
}
