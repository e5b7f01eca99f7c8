//! 1リクエスト分の抽出処理
//!
//! 画像の読み込み → バリアント生成 → 認識スイープ → 段階適用 → 出力組み立て。
//! 地名だけが読めた場合は ultra 段を追加で読み直してから再度解決する。

use crate::config::Config;
use crate::engine::{catalog, RecognitionConfig, TesseractEngine, TextRecognizer};
use crate::error::{Result, SnapGeoError};
use crate::sweep::{CancelToken, RecognitionSweep};
use crate::variant::{self, is_ultra_label, VariantTier};
use image::DynamicImage;
use snapgeo_common::{retag_escalated, Cascade, Corpus, ExtractionOutput, Resolution};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Extractor {
    engine: Arc<dyn TextRecognizer>,
    sweep: RecognitionSweep,
    cascade: Arc<Cascade>,
    configs: Vec<RecognitionConfig>,
}

impl Extractor {
    pub fn new(engine: Arc<dyn TextRecognizer>, cascade: Cascade, max_workers: usize) -> Result<Self> {
        Ok(Self {
            engine,
            sweep: RecognitionSweep::new(max_workers)?,
            cascade: Arc::new(cascade),
            configs: catalog().to_vec(),
        })
    }

    /// 設定から Tesseract を使う抽出器を作る
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = Arc::new(TesseractEngine::from_config(config));
        Self::new(engine, config.cascade()?, config.max_workers)
    }

    /// 使う認識設定を差し替える
    pub fn with_configs(mut self, configs: Vec<RecognitionConfig>) -> Self {
        self.configs = configs;
        self
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    pub fn extract_file(
        &self,
        path: &Path,
        aggressive: bool,
        cancel: &CancelToken,
    ) -> Result<ExtractionOutput> {
        if !path.is_file() {
            return Err(SnapGeoError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        self.extract_bytes(&bytes, aggressive, cancel)
    }

    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        aggressive: bool,
        cancel: &CancelToken,
    ) -> Result<ExtractionOutput> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| SnapGeoError::MalformedImage(e.to_string()))?;
        self.extract_image(&image, aggressive, cancel)
    }

    pub fn extract_image(
        &self,
        image: &DynamicImage,
        aggressive: bool,
        cancel: &CancelToken,
    ) -> Result<ExtractionOutput> {
        self.engine.check_available()?;

        let variants = variant::generate(image, aggressive);
        info!(
            width = image.width(),
            height = image.height(),
            variants = variants.len(),
            configs = self.configs.len(),
            aggressive,
            "認識開始"
        );
        let mut corpus =
            Corpus::new(self.sweep.run(self.engine.as_ref(), &variants, &self.configs, cancel)?);

        let candidate = match self.cascade.resolve(&corpus, !aggressive) {
            Resolution::Found { candidate, stage } => {
                debug!(%stage, method = %candidate.method, "候補を採用");
                Some(candidate)
            }
            Resolution::NotFound => None,
            Resolution::Escalate { trigger } => {
                warn!(%trigger, "座標なし、地名のみ一致。追加処理で読み直します");
                let ultra = variant::generate_tier(image, VariantTier::Ultra);
                let more = self.sweep.run(self.engine.as_ref(), &ultra, &self.configs, cancel)?;
                corpus.extend(more);

                match self.cascade.resolve(&corpus, false) {
                    Resolution::Found { candidate, stage } => {
                        let candidate = retag_escalated(candidate, is_ultra_label);
                        debug!(%stage, method = %candidate.method, "追加処理後に候補を採用");
                        Some(candidate)
                    }
                    _ => None,
                }
            }
        };

        let output = self.cascade.assemble(&corpus, candidate.as_ref());
        match output.coordinate() {
            Some(report) => {
                if !self.cascade.bounds.contains(report.latitude, report.longitude) {
                    warn!(
                        latitude = report.latitude,
                        longitude = report.longitude,
                        "座標が想定範囲外です"
                    );
                }
                info!(
                    latitude = report.latitude,
                    longitude = report.longitude,
                    method = %report.confidence.method,
                    score = report.confidence.score,
                    source = %report.ocr_method,
                    "座標を抽出"
                );
            }
            None => info!(results = corpus.len(), "座標が見つかりません"),
        }
        Ok(output)
    }

    /// 期限付きで抽出する
    ///
    /// 期限を過ぎると未着手の認識を取りやめ、`Timeout` を返す。
    pub async fn extract_with_timeout(
        &self,
        bytes: Vec<u8>,
        aggressive: bool,
        timeout: Duration,
    ) -> Result<ExtractionOutput> {
        let cancel = CancelToken::with_deadline(timeout);
        let token = cancel.clone();
        let worker = self.clone();
        let handle =
            tokio::task::spawn_blocking(move || worker.extract_bytes(&bytes, aggressive, &token));

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Err(SnapGeoError::Cancelled))) if cancel.is_expired() => {
                Err(SnapGeoError::Timeout(timeout.as_millis()))
            }
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(SnapGeoError::Io(std::io::Error::other(join_error))),
            Err(_) => {
                cancel.cancel();
                Err(SnapGeoError::Timeout(timeout.as_millis()))
            }
        }
    }
}
