//! 抽出パイプラインの型定義
//!
//! CLIとライブラリ利用側で共有される型:
//! - RecognitionResult: 1回の文字認識（variant × config）の出力
//! - CoordinateCandidate: 各段階が返す座標候補
//! - ConfidenceResult: 候補から導出される信頼度
//! - ExtractionOutput: 最終出力（JSON形状は固定）

use serde::{Deserialize, Serialize};
use std::fmt;

/// 座標を得た手法（信頼順）
///
/// 列挙順がそのまま優先度。`priority()` が小さいほど信頼できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodTag {
    DirectOcr,
    FileSpecificCorrection,
    FragmentReconstruction,
    PatternMatching,
    EnhancedOcr,
    UltraProcessing,
    GeographicEstimation,
    Unknown,
}

impl MethodTag {
    pub const ALL: [MethodTag; 8] = [
        MethodTag::DirectOcr,
        MethodTag::FileSpecificCorrection,
        MethodTag::FragmentReconstruction,
        MethodTag::PatternMatching,
        MethodTag::EnhancedOcr,
        MethodTag::UltraProcessing,
        MethodTag::GeographicEstimation,
        MethodTag::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodTag::DirectOcr => "direct_ocr",
            MethodTag::FileSpecificCorrection => "file_specific_correction",
            MethodTag::FragmentReconstruction => "fragment_reconstruction",
            MethodTag::PatternMatching => "pattern_matching",
            MethodTag::EnhancedOcr => "enhanced_ocr",
            MethodTag::UltraProcessing => "ultra_processing",
            MethodTag::GeographicEstimation => "geographic_estimation",
            MethodTag::Unknown => "unknown",
        }
    }

    /// 0 が最優先
    pub fn priority(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 文字認識1回分の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionResult {
    /// エンジンが返したテキスト（失敗時は空文字）
    pub text: String,
    pub config_label: String,
    pub variant_label: String,
}

impl RecognitionResult {
    pub fn new(
        text: impl Into<String>,
        variant_label: impl Into<String>,
        config_label: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            config_label: config_label.into(),
            variant_label: variant_label.into(),
        }
    }

    /// `<variant>_<config>` 形式のラベル（ocr_method / provenance に使用）
    pub fn label(&self) -> String {
        format!("{}_{}", self.variant_label, self.config_label)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 座標候補
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub method: MethodTag,
    pub latitude_reconstructed: bool,
    pub longitude_reconstructed: bool,
    /// 候補に寄与した RecognitionResult のラベル
    pub provenance: Vec<String>,
}

impl CoordinateCandidate {
    pub fn new(latitude: f64, longitude: f64, method: MethodTag) -> Self {
        Self {
            latitude,
            longitude,
            method,
            latitude_reconstructed: false,
            longitude_reconstructed: false,
            provenance: Vec::new(),
        }
    }

    pub fn reconstructed(mut self, latitude: bool, longitude: bool) -> Self {
        self.latitude_reconstructed = latitude;
        self.longitude_reconstructed = longitude;
        self
    }

    pub fn with_provenance<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for label in labels {
            let label = label.into();
            if !self.provenance.contains(&label) {
                self.provenance.push(label);
            }
        }
        self
    }

    /// NaNでなく、緯度経度の定義域内にあるか
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// 信頼度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    MediumHigh,
    Medium,
    MediumLow,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "very_high",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::MediumHigh => "medium_high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::MediumLow => "medium_low",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 信頼度（CoordinateCandidate からのみ導出される）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub score: f64,
    pub level: ConfidenceLevel,
    pub method: MethodTag,
    pub explanation: String,
}

/// オーバーレイに焼き込まれた座標以外の情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// 座標が得られた場合の出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateReport {
    pub raw_text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_reconstructed: bool,
    pub longitude_reconstructed: bool,
    pub confidence: ConfidenceResult,
    pub ocr_method: String,
    #[serde(flatten)]
    pub metadata: OverlayMetadata,
}

/// 座標が得られなかった場合の出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotFoundReport {
    pub error: String,
    #[serde(default)]
    pub location_info: Vec<String>,
    #[serde(default)]
    pub raw_text: String,
}

/// 1リクエストの最終出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionOutput {
    Found(CoordinateReport),
    NotFound(NotFoundReport),
}

impl ExtractionOutput {
    pub fn is_found(&self) -> bool {
        matches!(self, ExtractionOutput::Found(_))
    }

    pub fn coordinate(&self) -> Option<&CoordinateReport> {
        match self {
            ExtractionOutput::Found(report) => Some(report),
            ExtractionOutput::NotFound(_) => None,
        }
    }

    pub fn raw_text(&self) -> &str {
        match self {
            ExtractionOutput::Found(report) => &report.raw_text,
            ExtractionOutput::NotFound(report) => &report.raw_text,
        }
    }
}
