use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use snapgeo_ocr::{cli, config, engine, error, logging, scanner, Extractor, ExtractionOutput};
use cli::{Cli, Commands};
use config::Config;
use error::{Result, SnapGeoError};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// 座標が見つからなかったときの終了コード
const EXIT_NOT_FOUND: i32 = 2;

#[derive(Serialize)]
struct BatchEntry {
    file_name: String,
    path: PathBuf,
    captured_at: Option<String>,
    exif_gps: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ExtractionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Extract { image, aggressive, pretty, timeout } => {
            if !image.is_file() {
                return Err(SnapGeoError::FileNotFound(image.display().to_string()));
            }
            let timeout = Duration::from_secs(timeout.unwrap_or(config.request_timeout_seconds));
            let extractor = Extractor::from_config(&config)?;

            let bytes = std::fs::read(&image)?;
            let output = extractor.extract_with_timeout(bytes, aggressive, timeout).await?;
            println!("{}", to_json(&output, pretty)?);

            if !output.is_found() {
                std::process::exit(EXIT_NOT_FOUND);
            }
        }

        Commands::Batch { folder, output, aggressive, recursive } => {
            let images = scanner::scan_folder(&folder, recursive)?;
            if images.is_empty() {
                return Err(SnapGeoError::NoImagesFound(folder.display().to_string()));
            }
            info!(count = images.len(), folder = %folder.display(), "バッチ処理開始");

            let extractor = Extractor::from_config(&config)?;
            let timeout = Duration::from_secs(config.request_timeout_seconds);

            let progress = ProgressBar::new(images.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                    .map(|s| s.progress_chars("=> "))
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let mut entries = Vec::with_capacity(images.len());
            let mut found = 0usize;
            for image in images {
                progress.set_message(image.file_name.clone());
                let outcome = match std::fs::read(&image.path) {
                    Ok(bytes) => extractor.extract_with_timeout(bytes, aggressive, timeout).await,
                    Err(e) => Err(SnapGeoError::Io(e)),
                };
                let (result, error) = match outcome {
                    Ok(result) => {
                        found += usize::from(result.is_found());
                        (Some(result), None)
                    }
                    Err(e) => {
                        warn!(file = %image.file_name, error = %e, "抽出に失敗");
                        (None, Some(e.to_string()))
                    }
                };
                entries.push(BatchEntry {
                    file_name: image.file_name,
                    path: image.path,
                    captured_at: image.captured_at,
                    exif_gps: image.exif_gps,
                    result,
                    error,
                });
                progress.inc(1);
            }
            progress.finish_and_clear();
            info!(total = entries.len(), found, "バッチ処理完了");

            let json = to_json(&entries, true)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    info!(output = %path.display(), "結果を保存");
                }
                None => println!("{}", json),
            }
        }

        Commands::Config { show, set_tesseract, set_workers } => {
            let mut config = config;

            if let Some(path) = set_tesseract {
                config.set_tesseract_path(path)?;
                println!("✔ Tesseract のパスを設定しました");
            }

            if let Some(workers) = set_workers {
                config.set_max_workers(workers)?;
                println!("✔ 並列数を設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  Tesseract: {}",
                    config
                        .tesseract_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "tesseract (PATH)".into())
                );
                println!("  言語: {}", config.language);
                println!("  並列数: {}", config.max_workers);
                println!("  タイムアウト: {}秒", config.request_timeout_seconds);
                println!(
                    "  範囲: 緯度 {}〜{} / 経度 {}〜{}",
                    config.bounds.min_lat,
                    config.bounds.max_lat,
                    config.bounds.min_lon,
                    config.bounds.max_lon
                );
                println!("  追加地名: {}件", config.extra_locations.len());
            }
        }

        Commands::Catalog => {
            for config in engine::catalog() {
                println!("{}", config);
            }
        }
    }

    Ok(())
}
