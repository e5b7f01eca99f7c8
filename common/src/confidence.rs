//! 信頼度の算出
//!
//! 手法ごとの基礎点に、範囲外（×0.5）と過剰な精度（×0.9）の補正をかける。

use crate::bounds::GeoBounds;
use crate::types::{ConfidenceLevel, ConfidenceResult, CoordinateCandidate, MethodTag};

/// これを超える小数桁は桁の連結ミスを疑う
pub const MAX_PLAUSIBLE_DECIMALS: usize = 8;

pub const OUT_OF_BOUNDS_FACTOR: f64 = 0.5;
pub const HIGH_PRECISION_FACTOR: f64 = 0.9;

pub fn base_score(method: MethodTag) -> f64 {
    match method {
        MethodTag::DirectOcr => 0.95,
        MethodTag::FileSpecificCorrection => 0.90,
        MethodTag::FragmentReconstruction => 0.85,
        MethodTag::PatternMatching => 0.80,
        MethodTag::EnhancedOcr => 0.75,
        MethodTag::UltraProcessing => 0.70,
        MethodTag::GeographicEstimation => 0.60,
        MethodTag::Unknown => 0.30,
    }
}

pub fn level_for(score: f64) -> ConfidenceLevel {
    if score >= 0.90 {
        ConfidenceLevel::VeryHigh
    } else if score >= 0.80 {
        ConfidenceLevel::High
    } else if score >= 0.70 {
        ConfidenceLevel::MediumHigh
    } else if score >= 0.60 {
        ConfidenceLevel::Medium
    } else if score >= 0.50 {
        ConfidenceLevel::MediumLow
    } else {
        ConfidenceLevel::Low
    }
}

fn explanation_template(method: MethodTag) -> &'static str {
    match method {
        MethodTag::DirectOcr => "Coordinates found directly in OCR text without reconstruction",
        MethodTag::FileSpecificCorrection => {
            "Coordinates corrected using a known misrecognition pattern"
        }
        MethodTag::FragmentReconstruction => "Coordinates reconstructed from detected fragments",
        MethodTag::PatternMatching => {
            "Coordinates found through pattern matching and reconstruction"
        }
        MethodTag::EnhancedOcr => "Coordinates extracted using enhanced OCR processing",
        MethodTag::UltraProcessing => "Coordinates extracted using ultra-enhanced OCR processing",
        MethodTag::GeographicEstimation => "Coordinates estimated from detected location names",
        MethodTag::Unknown => "Coordinates obtained through OCR processing",
    }
}

/// 最短表記での小数桁数
pub fn decimal_places(value: f64) -> usize {
    let repr = value.to_string();
    repr.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

/// 補正前の丸めない点数
pub fn raw_score(candidate: &CoordinateCandidate, bounds: &GeoBounds) -> f64 {
    let mut score = base_score(candidate.method);
    if !bounds.contains(candidate.latitude, candidate.longitude) {
        score *= OUT_OF_BOUNDS_FACTOR;
    }
    if is_over_precise(candidate) {
        score *= HIGH_PRECISION_FACTOR;
    }
    score.clamp(0.0, 1.0)
}

fn is_over_precise(candidate: &CoordinateCandidate) -> bool {
    decimal_places(candidate.latitude) > MAX_PLAUSIBLE_DECIMALS
        || decimal_places(candidate.longitude) > MAX_PLAUSIBLE_DECIMALS
}

pub fn score(candidate: &CoordinateCandidate, bounds: &GeoBounds) -> ConfidenceResult {
    let raw = raw_score(candidate, bounds);

    let mut explanation = explanation_template(candidate.method).to_string();
    if !bounds.contains(candidate.latitude, candidate.longitude) {
        explanation.push_str(" (coordinates outside expected bounds)");
    }
    if is_over_precise(candidate) {
        explanation.push_str(" (very high precision may indicate estimation)");
    }

    ConfidenceResult {
        score: (raw * 1000.0).round() / 1000.0,
        level: level_for(raw),
        method: candidate.method,
        explanation,
    }
}
