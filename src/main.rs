//! 作物病害診断CLI
//!
//! 画像ファイルの読み込みはここで行い、ライブラリにはバイト列だけを渡します。

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use leaf_doctor_lib::logging::{init_logging, LogConfig};
use leaf_doctor_lib::model::{describe_metadata, load_metadata};
use leaf_doctor_lib::{AppConfig, CropType, Predictor};

#[derive(Parser, Debug)]
#[command(name = "leaf_doctor", version, about = "Crop leaf disease classifier")]
struct Cli {
    /// 設定ファイル（省略時は ./config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// デバッグログを出力する
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 画像を診断して結果をJSONで出力
    Predict {
        /// apple / corn / cherry / grape / tomato
        #[arg(long)]
        crop: String,
        /// 葉の画像（JPEG / PNG）
        image: PathBuf,
    },
    /// モデルアーティファクトのメタデータを表示
    Inspect { artifact: PathBuf },
    /// 全作物のモデルを読み込めるか確認
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load_or_default(&config_path);

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::from(&config.logging)
    };
    init_logging(&log_config)?;

    match cli.command {
        Command::Predict { crop, image } => {
            let predictor = Predictor::from_config(&config)?;
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read image: {}", image.display()))?;

            let result = predictor
                .predict(&crop, &bytes)
                .with_context(|| format!("Prediction failed for {}", image.display()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Inspect { artifact } => {
            let metadata = load_metadata(&artifact)?;
            println!("{}", describe_metadata(&metadata));
        }
        Command::Check => {
            let predictor = Predictor::from_config(&config)?;
            for crop in CropType::ALL {
                let path = predictor.registry().routes().path(crop).display().to_string();
                match predictor.registry().get_classifier(crop) {
                    Ok(classifier) => println!(
                        "{:<7} ok      {} ({} classes)",
                        crop.as_str(),
                        path,
                        classifier.num_classes()
                    ),
                    Err(e) => println!("{:<7} failed  {}", crop.as_str(), e),
                }
            }
        }
    }

    Ok(())
}
