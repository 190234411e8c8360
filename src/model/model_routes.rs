//! 作物ごとのモデル配置表
//!
//! 起動時に一度だけ組み立て、全作物についてモデルファイルのパスが
//! 設定されていることを確認します。

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::crop::CropType;
use crate::model::config::ModelSettings;

/// 作物 -> モデルファイルのパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoutes {
    paths: [PathBuf; 5],
}

impl ModelRoutes {
    /// パスを決める関数から配置表を作成
    pub fn new(path_for: impl Fn(CropType) -> PathBuf) -> Result<Self> {
        let paths = CropType::ALL.map(&path_for);

        for crop in CropType::ALL {
            if paths[crop.index()].as_os_str().is_empty() {
                bail!("no model path configured for {}", crop);
            }
        }

        Ok(Self { paths })
    }

    /// 設定から配置表を作成
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        Self::new(|crop| settings.path_for(crop))
    }

    /// 全作物を同じディレクトリに置く場合
    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::new(|crop| dir.join(format!("{}_model.tar.gz", crop)))
    }

    /// 作物のモデルファイルのパス
    pub fn path(&self, crop: CropType) -> &Path {
        &self.paths[crop.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_settings() {
        let routes = ModelRoutes::from_settings(&ModelSettings::default()).unwrap();
        for crop in CropType::ALL {
            assert_eq!(
                routes.path(crop),
                Path::new("models").join(format!("{}_model.tar.gz", crop))
            );
        }
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = ModelRoutes::new(|crop| {
            if crop == CropType::Grape {
                PathBuf::new()
            } else {
                PathBuf::from("x.tar.gz")
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("grape"));
    }
}
