//! モデルとメタデータの永続化
//!
//! Tar.gz形式でモデルとメタデータを1ファイルに統合して保存・読み込みします。
//!
//! ファイル構成（tar.gz内部）:
//! - metadata.json   - メタデータ（作物、ラベル一覧、入力サイズなど）
//! - model.bin       - モデルの重み（BinBytesRecorder形式）

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};
use tracing::info;

use crate::model::model_metadata::ModelMetadata;

const METADATA_ENTRY: &str = "metadata.json";
const MODEL_ENTRY: &str = "model.bin";

/// メタデータと共にモデルをTar.gz形式で保存
///
/// 保存先のパスを返します（拡張子が `.gz` でなければ `.tar.gz` を付与）。
pub fn save_model_with_metadata(
    output_path: &Path,
    metadata: &ModelMetadata,
    model_binary: &[u8],
) -> Result<PathBuf> {
    let tar_gz_path = if output_path.extension().and_then(|s| s.to_str()) == Some("gz") {
        output_path.to_path_buf()
    } else {
        output_path.with_extension("tar.gz")
    };

    if let Some(parent) = tar_gz_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create parent directory: {:?}", parent))?;
    }

    let tar_gz_file = File::create(&tar_gz_path)
        .context(format!("Failed to create tar.gz file: {:?}", tar_gz_path))?;

    let encoder = GzEncoder::new(tar_gz_file, Compression::default());
    let mut tar_builder = Builder::new(encoder);

    let json_str = metadata.to_json_string()?;
    append_entry(&mut tar_builder, METADATA_ENTRY, json_str.as_bytes())?;
    append_entry(&mut tar_builder, MODEL_ENTRY, model_binary)?;

    tar_builder
        .into_inner()
        .context("Failed to finalize tar archive")?
        .finish()
        .context("Failed to finalize gzip stream")?;

    info!(path = %tar_gz_path.display(), crop = %metadata.crop, "saved model artifact");
    Ok(tar_gz_path)
}

fn append_entry<W: std::io::Write>(builder: &mut Builder<W>, name: &str, bytes: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_path(name)?;
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append(&header, bytes)
        .context(format!("Failed to add {} to tar", name))
}

/// Tar.gzからモデルメタデータのみを読み込む
pub fn load_metadata(tar_gz_path: &Path) -> Result<ModelMetadata> {
    let tar_gz_file = File::open(tar_gz_path)
        .context(format!("Failed to open tar.gz file: {:?}", tar_gz_path))?;

    let decoder = GzDecoder::new(tar_gz_file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        if path.to_str() == Some(METADATA_ENTRY) {
            let mut json_str = String::new();
            entry.read_to_string(&mut json_str)?;
            return ModelMetadata::from_json_string(&json_str);
        }
    }

    Err(anyhow::anyhow!("metadata.json not found in tar.gz archive"))
}

/// メタデータとモデルバイナリを共に読み込む
pub fn load_model_with_metadata(tar_gz_path: &Path) -> Result<(ModelMetadata, Vec<u8>)> {
    let tar_gz_file = File::open(tar_gz_path)
        .context(format!("Failed to open tar.gz file: {:?}", tar_gz_path))?;

    let decoder = GzDecoder::new(tar_gz_file);
    let mut archive = Archive::new(decoder);

    let mut metadata_opt: Option<ModelMetadata> = None;
    let mut model_binary_opt: Option<Vec<u8>> = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        match path.to_str() {
            Some(METADATA_ENTRY) => {
                let mut json_str = String::new();
                entry.read_to_string(&mut json_str)?;
                metadata_opt = Some(ModelMetadata::from_json_string(&json_str)?);
            }
            Some(MODEL_ENTRY) => {
                let mut buffer = Vec::new();
                entry.read_to_end(&mut buffer)?;
                model_binary_opt = Some(buffer);
            }
            _ => {}
        }
    }

    match (metadata_opt, model_binary_opt) {
        (Some(metadata), Some(binary)) => Ok((metadata, binary)),
        (None, _) => Err(anyhow::anyhow!("metadata.json not found in tar.gz archive")),
        (_, None) => Err(anyhow::anyhow!("model.bin not found in tar.gz archive")),
    }
}

/// メタデータの要約（CLI表示用）
pub fn describe_metadata(metadata: &ModelMetadata) -> String {
    format!(
        "crop: {}\nclasses ({}): {}\ninput: {}x{}\nhidden size: {}\ntrained at: {}",
        metadata.crop,
        metadata.num_classes(),
        metadata.class_labels.join(", "),
        metadata.image_width,
        metadata.image_height,
        metadata.hidden_size,
        metadata.trained_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::CropType;

    fn metadata() -> ModelMetadata {
        ModelMetadata::new(
            CropType::Cherry,
            vec![
                "Cherry_(including_sour)_Powdery_mildew".to_string(),
                "Cherry_(including_sour)_healthy".to_string(),
            ],
            32,
            32,
            16,
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_model_with_metadata(&dir.path().join("cherry_model"), &metadata(), b"weights")
            .unwrap();
        assert_eq!(saved, dir.path().join("cherry_model.tar.gz"));

        let (loaded, binary) = load_model_with_metadata(&saved).unwrap();
        assert_eq!(loaded.class_labels, metadata().class_labels);
        assert_eq!((loaded.image_width, loaded.image_height), (32, 32));
        assert_eq!(binary, b"weights");
        assert_eq!(load_metadata(&saved).unwrap().crop, CropType::Cherry);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model_with_metadata(&dir.path().join("none.tar.gz")).unwrap_err();
        assert!(err.to_string().contains("Failed to open tar.gz file"));
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tar.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();
        assert!(load_model_with_metadata(&path).is_err());
        assert!(load_metadata(&path).is_err());
    }

    #[test]
    fn test_archive_without_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.tar.gz");
        {
            let file = File::create(&path).unwrap();
            let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
            let json = metadata().to_json_string().unwrap();
            append_entry(&mut builder, METADATA_ENTRY, json.as_bytes()).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        let err = load_model_with_metadata(&path).unwrap_err();
        assert!(err.to_string().contains("model.bin not found"));
    }

    #[test]
    fn test_describe_metadata() {
        let text = describe_metadata(&metadata());
        assert!(text.contains("crop: cherry"));
        assert!(text.contains("input: 32x32"));
    }
}
