//! 抽出段階の優先順位付き適用と最終出力の組み立て
//!
//! PatternMatch → FragmentReconstruction → ContentRuleCorrection →
//! GeographicEstimation の順に試し、最初に妥当な候補を返した段階で止まる。
//! 異なる段階の片側同士を組み合わせることはない。

use crate::bounds::GeoBounds;
use crate::confidence;
use crate::corpus::Corpus;
use crate::corrections::{self, CorrectionOutcome};
use crate::fragment::{self, FragmentPolicy};
use crate::gazetteer::Gazetteer;
use crate::metadata::extract_metadata;
use crate::pattern::{self, PatternOutcome};
use crate::types::{
    CoordinateCandidate, CoordinateReport, ExtractionOutput, MethodTag, NotFoundReport,
    RecognitionResult,
};
use std::fmt;

pub const NOT_FOUND_MESSAGE: &str = "GPS coordinates not found";
pub const NOT_FOUND_WITH_LOCATION_MESSAGE: &str =
    "GPS coordinates not found, but extracted other location metadata";

const GPS_KEYWORDS: &[&str] = &["altitude", "speed", "index"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PatternMatch,
    FragmentReconstruction,
    ContentRuleCorrection,
    GeographicEstimation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PatternMatch => "pattern_match",
            Stage::FragmentReconstruction => "fragment_reconstruction",
            Stage::ContentRuleCorrection => "content_rule_correction",
            Stage::GeographicEstimation => "geographic_estimation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found {
        candidate: CoordinateCandidate,
        stage: Stage,
    },
    /// 追加の前処理で読み直すべき（地名のみ一致）
    Escalate { trigger: String },
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct Cascade {
    pub bounds: GeoBounds,
    pub gazetteer: Gazetteer,
    pub policy: FragmentPolicy,
}

impl Cascade {
    pub fn new(bounds: GeoBounds, gazetteer: Gazetteer, policy: FragmentPolicy) -> Self {
        Self { bounds, gazetteer, policy }
    }

    /// 段階を順に試す
    ///
    /// `allow_escalation` が false のとき、地名のみの一致は地名推定へ進む。
    pub fn resolve(&self, corpus: &Corpus, allow_escalation: bool) -> Resolution {
        let partial = match pattern::match_patterns(corpus) {
            PatternOutcome::Complete(candidate) if candidate.is_valid() => {
                return Resolution::Found { candidate, stage: Stage::PatternMatch };
            }
            PatternOutcome::Partial(partial) => Some(partial),
            _ => None,
        };

        if let Some(candidate) =
            fragment::reconstruct(corpus, &self.bounds, &self.policy, partial.as_ref())
        {
            return Resolution::Found { candidate, stage: Stage::FragmentReconstruction };
        }

        match corrections::correct(corpus) {
            CorrectionOutcome::Corrected { candidate, .. } if candidate.is_valid() => {
                return Resolution::Found { candidate, stage: Stage::ContentRuleCorrection };
            }
            CorrectionOutcome::Escalate { trigger } if allow_escalation => {
                return Resolution::Escalate { trigger };
            }
            _ => {}
        }

        match self.gazetteer.estimate(corpus) {
            Some(candidate) => Resolution::Found { candidate, stage: Stage::GeographicEstimation },
            None => Resolution::NotFound,
        }
    }

    /// 追加処理なしで最後まで解決し、出力を組み立てる
    pub fn extract(&self, corpus: &Corpus) -> ExtractionOutput {
        match self.resolve(corpus, false) {
            Resolution::Found { candidate, .. } => self.assemble(corpus, Some(&candidate)),
            _ => self.assemble(corpus, None),
        }
    }

    pub fn assemble(
        &self,
        corpus: &Corpus,
        candidate: Option<&CoordinateCandidate>,
    ) -> ExtractionOutput {
        let source = candidate
            .and_then(|c| c.provenance.iter().find_map(|label| corpus.find(label)))
            .or_else(|| representative_result(corpus));
        let raw_text = source.map(|r| r.text.trim().to_string()).unwrap_or_default();

        let Some(candidate) = candidate else {
            let location_info = self.gazetteer.location_info(corpus);
            let error = if location_info.is_empty() {
                NOT_FOUND_MESSAGE
            } else {
                NOT_FOUND_WITH_LOCATION_MESSAGE
            };
            return ExtractionOutput::NotFound(NotFoundReport {
                error: error.to_string(),
                location_info,
                raw_text,
            });
        };

        ExtractionOutput::Found(CoordinateReport {
            raw_text,
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            latitude_reconstructed: candidate.latitude_reconstructed,
            longitude_reconstructed: candidate.longitude_reconstructed,
            confidence: confidence::score(candidate, &self.bounds),
            ocr_method: source.map(|r| r.label()).unwrap_or_else(|| MethodTag::Unknown.to_string()),
            metadata: extract_metadata(corpus.combined()),
        })
    }
}

/// 追加処理で得た候補の手法を付け替える
///
/// 寄与した結果がすべて追加処理分なら ultra_processing、それ以外は enhanced_ocr。
/// 補正表と地名推定の候補はそのまま。
pub fn retag_escalated<F>(mut candidate: CoordinateCandidate, is_escalated: F) -> CoordinateCandidate
where
    F: Fn(&str) -> bool,
{
    let retaggable = matches!(
        candidate.method,
        MethodTag::DirectOcr | MethodTag::PatternMatching | MethodTag::FragmentReconstruction
    );
    if !retaggable {
        return candidate;
    }

    candidate.method = if !candidate.provenance.is_empty()
        && candidate.provenance.iter().all(|label| is_escalated(label))
    {
        MethodTag::UltraProcessing
    } else {
        MethodTag::EnhancedOcr
    };
    candidate
}

/// 座標が得られない場合の代表テキスト
///
/// 座標らしき記述を含む最初の結果 → GPS関連語を含む最長の結果 → 最初の空でない結果
fn representative_result(corpus: &Corpus) -> Option<&RecognitionResult> {
    let results = corpus.results();

    if let Some(result) = results.iter().find(|r| pattern::has_coordinate_token(&r.text)) {
        return Some(result);
    }

    let mut keyword_best: Option<&RecognitionResult> = None;
    for result in results {
        let lower = result.text.to_lowercase();
        if !GPS_KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }
        if keyword_best.map_or(true, |b| result.text.trim().len() > b.text.trim().len()) {
            keyword_best = Some(result);
        }
    }

    keyword_best.or_else(|| results.iter().find(|r| !r.is_blank()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfidenceLevel;

    fn corpus(texts: &[&str]) -> Corpus {
        Corpus::from_texts(texts.iter().copied())
    }

    fn found(output: &ExtractionOutput) -> &CoordinateReport {
        output.coordinate().expect("expected coordinates")
    }

    // =============================================
    // 段階の順序
    // =============================================

    #[test]
    fn test_direct_pattern_stops_cascade() {
        let cascade = Cascade::default();
        let resolution = cascade.resolve(&corpus(&["Boyolali 6.26891158S 107.25537723E"]), true);
        match resolution {
            Resolution::Found { candidate, stage } => {
                assert_eq!(stage, Stage::PatternMatch);
                assert_eq!(candidate.method, MethodTag::DirectOcr);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fragments_before_corrections() {
        let cascade = Cascade::default();
        let c = corpus(&["7.5549S x", "110.6442", "55492507 64424782", "15537723E"]);
        match cascade.resolve(&c, true) {
            Resolution::Found { stage, .. } => assert_eq!(stage, Stage::FragmentReconstruction),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_content_rule_correction() {
        let cascade = Cascade::default();
        match cascade.resolve(&corpus(&["xx 15537723E"]), true) {
            Resolution::Found { candidate, stage } => {
                assert_eq!(stage, Stage::ContentRuleCorrection);
                assert_eq!(candidate.method, MethodTag::FileSpecificCorrection);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_location_trigger_escalates_only_when_allowed() {
        let cascade = Cascade::default();
        let c = corpus(&["Kecamatan Boyolali"]);
        assert_eq!(
            cascade.resolve(&c, true),
            Resolution::Escalate { trigger: "Boyolali".to_string() }
        );
        match cascade.resolve(&c, false) {
            Resolution::Found { stage, .. } => assert_eq!(stage, Stage::GeographicEstimation),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_partial_latitude_is_not_blended_with_estimate() {
        // 緯度だけ読めて経度の断片がない場合、地名推定の経度と混ぜない
        let cascade = Cascade::default();
        let c = corpus(&["7.55492507S", "Jakarta"]);
        match cascade.resolve(&c, false) {
            Resolution::Found { candidate, stage } => {
                assert_eq!(stage, Stage::GeographicEstimation);
                assert_eq!(candidate.latitude, -6.2);
                assert_eq!(candidate.longitude, 106.8);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    // =============================================
    // 出力の組み立て
    // =============================================

    #[test]
    fn test_extract_direct_output() {
        let cascade = Cascade::default();
        let c = corpus(&["Speed: 1.0km/h", "6.26891158S 107.25537723E\nAltitude: 12.5m"]);
        let output = cascade.extract(&c);
        let report = found(&output);
        assert_eq!(report.latitude, -6.26891158);
        assert_eq!(report.longitude, 107.25537723);
        assert_eq!(report.ocr_method, "input_2");
        assert_eq!(report.raw_text, "6.26891158S 107.25537723E\nAltitude: 12.5m");
        assert_eq!(report.confidence.level, ConfidenceLevel::VeryHigh);
        assert_eq!(report.metadata.altitude, Some(12.5));
        assert_eq!(report.metadata.speed, Some(1.0));
    }

    #[test]
    fn test_extract_dms_is_very_high() {
        let output = Cascade::default().extract(&corpus(&["7°33'15.8\"S 110°38'38.7\"E"]));
        let report = found(&output);
        assert!((report.latitude + 7.554).abs() < 1e-3);
        assert!((report.longitude - 110.644).abs() < 1e-3);
        assert_eq!(report.confidence.method, MethodTag::DirectOcr);
        assert_eq!(report.confidence.score, 0.95);
        assert_eq!(report.confidence.level, ConfidenceLevel::VeryHigh);
        assert!(!report.confidence.explanation.contains("precision"));
    }

    #[test]
    fn test_extract_geographic_estimation() {
        let output = Cascade::default().extract(&corpus(&["Kecamatan Boyolali"]));
        let report = found(&output);
        assert_eq!(report.confidence.method, MethodTag::GeographicEstimation);
        assert_eq!(report.confidence.score, 0.6);
        assert_eq!(report.confidence.level, ConfidenceLevel::Medium);
        assert!(!report.latitude_reconstructed);
    }

    #[test]
    fn test_extract_not_found_with_location_info() {
        let output = Cascade::default().extract(&corpus(&["", "Kelurahan Sukamaju\nSpeed: 0.0km/h"]));
        match output {
            ExtractionOutput::NotFound(report) => {
                assert_eq!(report.error, NOT_FOUND_WITH_LOCATION_MESSAGE);
                assert_eq!(report.location_info, vec!["Kelurahan Sukamaju"]);
                assert_eq!(report.raw_text, "Kelurahan Sukamaju\nSpeed: 0.0km/h");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_extract_not_found_irrelevant_text() {
        let output = Cascade::default().extract(&corpus(&["lorem ipsum", "dolor"]));
        match output {
            ExtractionOutput::NotFound(report) => {
                assert_eq!(report.error, NOT_FOUND_MESSAGE);
                assert!(report.location_info.is_empty());
                assert_eq!(report.raw_text, "lorem ipsum");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_representative_prefers_keyword_text() {
        let c = corpus(&["abc", "Speed: 0", "Altitude: 10m Speed: 0km/h"]);
        assert_eq!(representative_result(&c).unwrap().label(), "input_3");
        assert!(representative_result(&corpus(&["", " "])).is_none());
    }

    #[test]
    fn test_custom_bounds_change_confidence() {
        let tokyo = GeoBounds { min_lat: 30.0, max_lat: 46.0, min_lon: 129.0, max_lon: 146.0 };
        let cascade = Cascade::new(tokyo, Gazetteer::builtin(), FragmentPolicy::default());
        let output = cascade.extract(&corpus(&["35.6812N 139.7671E"]));
        assert_eq!(found(&output).confidence.score, 0.95);

        let output = Cascade::default().extract(&corpus(&["35.6812N 139.7671E"]));
        assert_eq!(found(&output).confidence.score, 0.475);
    }

    // =============================================
    // 追加処理後の付け替え
    // =============================================

    #[test]
    fn test_retag_escalated() {
        let is_ultra = |label: &str| label.starts_with("ultra_");

        let all_ultra = CoordinateCandidate::new(-7.5, 110.6, MethodTag::DirectOcr)
            .with_provenance(["ultra_crop2_ultra_coords"]);
        assert_eq!(retag_escalated(all_ultra, is_ultra).method, MethodTag::UltraProcessing);

        let mixed = CoordinateCandidate::new(-7.5, 110.6, MethodTag::FragmentReconstruction)
            .with_provenance(["full_psm6", "ultra_crop2_ultra_coords"]);
        assert_eq!(retag_escalated(mixed, is_ultra).method, MethodTag::EnhancedOcr);

        let estimate = CoordinateCandidate::new(-7.5, 110.6, MethodTag::GeographicEstimation)
            .with_provenance(["ultra_crop2_ultra_coords"]);
        assert_eq!(retag_escalated(estimate, is_ultra).method, MethodTag::GeographicEstimation);
    }
}
