//! 地名表と地名による座標推定
//!
//! 市・県レベルの地名 → 概略の中心座標。認識テキスト中に地名があれば、
//! 最も長い（具体的な）地名の中心を返す。長さが同じなら走査順で先のもの。

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::types::{CoordinateCandidate, MethodTag};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 地名と概略座標
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationHint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationHint {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }
}

const BUILTIN: &[(&str, f64, f64)] = &[
    ("Boyolali", -7.5, 110.6),
    ("Solo", -7.5, 110.6),
    ("Surakarta", -7.5, 110.6),
    ("Brebes", -6.9, 109.0),
    ("Tegal", -6.9, 109.0),
    ("Semarang", -7.0, 110.4),
    ("Yogyakarta", -7.8, 110.4),
    ("Jogja", -7.8, 110.4),
    ("Jakarta", -6.2, 106.8),
    ("Bandung", -6.9, 107.6),
    ("Surabaya", -7.3, 112.7),
    ("Bekasi", -6.24, 106.99),
    ("Bogor", -6.6, 106.8),
    ("Depok", -6.4, 106.82),
    ("Tangerang", -6.18, 106.63),
    ("Klaten", -7.71, 110.61),
    ("Sukoharjo", -7.68, 110.84),
    ("Salatiga", -7.33, 110.51),
    ("Magelang", -7.48, 110.22),
    ("Cirebon", -6.73, 108.55),
    ("Malang", -7.98, 112.63),
];

lazy_static::lazy_static! {
    // "Kecamatan Boyolali", "Jl. Solo Baru" など行政区分付きの名前
    static ref ADMINISTRATIVE_NAME: Regex = Regex::new(
        r"(?i:kecamatan|kabupaten|kota|desa|kelurahan|provinsi|kec\.|kab\.|jl\.)\s*[A-Z][A-Za-z]+(?: [A-Z][A-Za-z]+)*"
    ).unwrap();
}

/// 地名の一致（走査位置付き）
#[derive(Debug, Clone, PartialEq)]
pub struct LocationMatch<'a> {
    pub hint: &'a LocationHint,
    pub result_index: usize,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct Gazetteer {
    entries: Vec<LocationHint>,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Gazetteer {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(name, lat, lon)| LocationHint::new(*name, *lat, *lon))
            .collect();
        Self { entries }
    }

    /// 組み込みの表に設定ファイル由来の地名を追加する
    pub fn with_extra(extra: &[LocationHint]) -> Result<Self> {
        let mut gazetteer = Self::builtin();
        for hint in extra {
            if hint.name.trim().is_empty() {
                return Err(Error::Config("extra_locations: empty name".into()));
            }
            if !(-90.0..=90.0).contains(&hint.latitude) || !(-180.0..=180.0).contains(&hint.longitude)
            {
                return Err(Error::Config(format!(
                    "extra_locations: {} has invalid coordinates ({}, {})",
                    hint.name, hint.latitude, hint.longitude
                )));
            }
            gazetteer.entries.push(hint.clone());
        }
        Ok(gazetteer)
    }

    pub fn entries(&self) -> &[LocationHint] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 全一致を走査順に返す
    pub fn find_all(&self, corpus: &Corpus) -> Vec<LocationMatch<'_>> {
        let mut matches = Vec::new();
        for (result_index, result) in corpus.results().iter().enumerate() {
            let haystack = result.text.to_ascii_lowercase();
            for hint in &self.entries {
                let needle = hint.name.to_ascii_lowercase();
                if let Some(offset) = find_word(&haystack, &needle) {
                    matches.push(LocationMatch { hint, result_index, offset });
                }
            }
        }
        matches.sort_by_key(|m| (m.result_index, m.offset));
        matches
    }

    /// 最長一致の地名から座標を推定する
    pub fn estimate(&self, corpus: &Corpus) -> Option<CoordinateCandidate> {
        let matches = self.find_all(corpus);

        let mut best: Option<&LocationMatch<'_>> = None;
        for m in &matches {
            if best.map_or(true, |b| m.hint.name.len() > b.hint.name.len()) {
                best = Some(m);
            }
        }

        let best = best?;
        let label = corpus.results()[best.result_index].label();
        let candidate = CoordinateCandidate::new(
            best.hint.latitude,
            best.hint.longitude,
            MethodTag::GeographicEstimation,
        )
        .with_provenance([label]);
        candidate.is_valid().then_some(candidate)
    }

    /// 座標が得られなかったときに返す地名情報（走査順、重複なし）
    pub fn location_info(&self, corpus: &Corpus) -> Vec<String> {
        let mut found: Vec<(usize, usize, String)> = Vec::new();

        for (result_index, result) in corpus.results().iter().enumerate() {
            for m in ADMINISTRATIVE_NAME.find_iter(&result.text) {
                found.push((result_index, m.start(), m.as_str().trim().to_string()));
            }
        }
        for m in self.find_all(corpus) {
            found.push((m.result_index, m.offset, m.hint.name.clone()));
        }

        found.sort_by_key(|(idx, offset, _)| (*idx, *offset));

        let mut info: Vec<String> = Vec::new();
        for (_, _, name) in found {
            if !info.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                info.push(name);
            }
        }
        info
    }
}

/// 英数字に挟まれていない位置での最初の出現
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.match_indices(needle).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Corpus {
        Corpus::from_texts(texts.iter().copied())
    }

    // =============================================
    // 推定
    // =============================================

    #[test]
    fn test_estimate_boyolali() {
        let candidate = Gazetteer::builtin().estimate(&corpus(&["Kecamatan Boyolali"])).unwrap();
        assert_eq!(candidate.latitude, -7.5);
        assert_eq!(candidate.longitude, 110.6);
        assert_eq!(candidate.method, MethodTag::GeographicEstimation);
        assert!(!candidate.latitude_reconstructed);
        assert!(!candidate.longitude_reconstructed);
    }

    #[test]
    fn test_case_insensitive() {
        let candidate = Gazetteer::builtin().estimate(&corpus(&["JAKARTA SELATAN"])).unwrap();
        assert_eq!(candidate.latitude, -6.2);
    }

    #[test]
    fn test_longest_name_wins() {
        let candidate =
            Gazetteer::builtin().estimate(&corpus(&["Solo", "Kota Surakarta"])).unwrap();
        assert_eq!(candidate.provenance, vec!["input_2"]);
    }

    #[test]
    fn test_equal_length_prefers_scan_order() {
        // Bekasi と Brebes は同じ長さ
        let candidate = Gazetteer::builtin().estimate(&corpus(&["Brebes", "Bekasi"])).unwrap();
        assert_eq!(candidate.latitude, -6.9);
        let candidate = Gazetteer::builtin().estimate(&corpus(&["Bekasi Brebes"])).unwrap();
        assert_eq!(candidate.latitude, -6.24);
    }

    #[test]
    fn test_names_inside_words_do_not_match() {
        assert!(Gazetteer::builtin().estimate(&corpus(&["Solok", "Malangbong2"])).is_none());
    }

    #[test]
    fn test_no_place_names() {
        assert!(Gazetteer::builtin().estimate(&corpus(&["Speed: 0.0km/h", ""])).is_none());
    }

    // =============================================
    // 設定による拡張
    // =============================================

    #[test]
    fn test_with_extra_locations() {
        let extra = vec![LocationHint::new("Teras", -7.55, 110.64)];
        let gazetteer = Gazetteer::with_extra(&extra).unwrap();
        assert_eq!(gazetteer.len(), Gazetteer::builtin().len() + 1);
        let candidate = gazetteer.estimate(&corpus(&["teras"])).unwrap();
        assert_eq!(candidate.longitude, 110.64);
    }

    #[test]
    fn test_with_extra_rejects_invalid() {
        assert!(Gazetteer::with_extra(&[LocationHint::new(" ", 0.0, 0.0)]).is_err());
        assert!(Gazetteer::with_extra(&[LocationHint::new("X", 95.0, 0.0)]).is_err());
    }

    // =============================================
    // location_info
    // =============================================

    #[test]
    fn test_location_info_collects_administrative_names() {
        let info = Gazetteer::builtin()
            .location_info(&corpus(&["Kecamatan Teras", "Kabupaten Boyolali 12:03"]));
        assert_eq!(info, vec!["Kecamatan Teras", "Kabupaten Boyolali", "Boyolali"]);
    }

    #[test]
    fn test_location_info_dedups() {
        let info = Gazetteer::builtin().location_info(&corpus(&["Jakarta", "jakarta"]));
        assert_eq!(info, vec!["Jakarta"]);
    }

    #[test]
    fn test_location_info_empty_for_irrelevant_text() {
        let info = Gazetteer::builtin().location_info(&corpus(&["lorem ipsum", "12:00"]));
        assert!(info.is_empty());
    }
}
