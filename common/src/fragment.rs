//! 断片からの座標復元
//!
//! 密なオーバーレイ文字は設定ごとに別々の部分文字列として読まれることが多い
//! （ある設定は `55492507`、別の設定は `5549`、さらに別の設定は途中で切れる）。
//! ここでは各認識結果の数字列を断片とみなし、
//!
//! 1. `<整数>.<小数>` の形をした種（seed）を緯度／経度に振り分け
//!    （小数点が落ちた `755492507S` のような数字列も、範囲に入る位置で区切って種にする）
//! 2. 種の小数部、またはそれを先頭に持つ数字列のうち最長のものを候補とし
//! 3. 他の結果の断片が候補の接頭辞／接尾辞として一致するかを数える
//!
//! 一致した結果が `min_sources` 以上、候補長が `min_digits` 以上なら採用する。
//! 緯度と経度は独立に復元する。

use crate::bounds::GeoBounds;
use crate::corpus::Corpus;
use crate::pattern::PartialCoordinate;
use crate::types::{CoordinateCandidate, MethodTag};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 断片一致の採用基準
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentPolicy {
    /// 一致とみなす最小桁数
    pub min_digits: usize,
    /// 一致が必要な独立した認識結果の数
    pub min_sources: usize,
}

impl Default for FragmentPolicy {
    fn default() -> Self {
        Self { min_digits: 4, min_sources: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// 片側の復元結果
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub value: f64,
    /// 採用した小数部の数字列
    pub digits: String,
    /// 一致した認識結果のラベル
    pub sources: Vec<String>,
}

lazy_static::lazy_static! {
    static ref DECIMAL_FRAGMENT: Regex = Regex::new(
        r"(?i)(?:^|[^\d.])(\d{1,3})\.(\d+)(?:\s*°?\s*([NSEW]))?"
    ).unwrap();
    // 許可文字を絞った設定では小数点が落ちる: 755492507S, 11064424782E
    static ref UNDOTTED_FRAGMENT: Regex = Regex::new(
        r"(?i)(?:^|[^\d.])(\d{6,14})\s*°?\s*([NSEW])"
    ).unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
}

#[derive(Debug, Clone)]
struct Seed {
    integer: String,
    digits: String,
    sign: f64,
    result_idx: usize,
}

/// 断片から座標候補を組み立てる
///
/// `partial` にパターン照合で得た片側があれば、その側はそのまま使い
/// 欠けている側だけを復元する。
pub fn reconstruct(
    corpus: &Corpus,
    bounds: &GeoBounds,
    policy: &FragmentPolicy,
    partial: Option<&PartialCoordinate>,
) -> Option<CoordinateCandidate> {
    let known_lat = partial.and_then(|p| p.latitude.as_ref());
    let known_lon = partial.and_then(|p| p.longitude.as_ref());

    let (latitude, lat_reconstructed, mut provenance) = match known_lat {
        Some(half) => (half.value, false, vec![half.label.clone()]),
        None => {
            let rec = reconstruct_axis(corpus, Axis::Latitude, bounds, policy)?;
            (rec.value, true, rec.sources)
        }
    };

    let (longitude, lon_reconstructed) = match known_lon {
        Some(half) => {
            provenance.push(half.label.clone());
            (half.value, false)
        }
        None => {
            let rec = reconstruct_axis(corpus, Axis::Longitude, bounds, policy)?;
            provenance.extend(rec.sources);
            (rec.value, true)
        }
    };

    if !lat_reconstructed && !lon_reconstructed {
        return None;
    }

    let candidate = CoordinateCandidate::new(latitude, longitude, MethodTag::FragmentReconstruction)
        .reconstructed(lat_reconstructed, lon_reconstructed)
        .with_provenance(provenance);
    candidate.is_valid().then_some(candidate)
}

/// 片側だけを復元する
pub fn reconstruct_axis(
    corpus: &Corpus,
    axis: Axis,
    bounds: &GeoBounds,
    policy: &FragmentPolicy,
) -> Option<Reconstruction> {
    let seeds = collect_seeds(corpus, axis, bounds);
    if seeds.is_empty() {
        return None;
    }

    let runs: Vec<Vec<&str>> = corpus
        .results()
        .iter()
        .map(|r| DIGIT_RUN.find_iter(&r.text).map(|m| m.as_str()).collect())
        .collect();

    // (整数部, 符号) ごとにまとめる（初出順）
    let mut groups: Vec<Vec<&Seed>> = Vec::new();
    for seed in &seeds {
        match groups
            .iter_mut()
            .find(|g| g[0].integer == seed.integer && g[0].sign == seed.sign)
        {
            Some(group) => group.push(seed),
            None => groups.push(vec![seed]),
        }
    }

    let mut best: Option<(usize, Reconstruction)> = None;
    for group in groups {
        let Some(rec) = evaluate_group(corpus, &group, &runs, axis, policy) else {
            continue;
        };
        let support = rec.sources.len();
        let better = match &best {
            None => true,
            Some((best_support, best_rec)) => {
                support > *best_support
                    || (support == *best_support && rec.digits.len() > best_rec.digits.len())
            }
        };
        if better {
            best = Some((support, rec));
        }
    }

    best.map(|(_, rec)| rec)
}

fn collect_seeds(corpus: &Corpus, axis: Axis, bounds: &GeoBounds) -> Vec<Seed> {
    let mut seeds = Vec::new();

    for (result_idx, result) in corpus.results().iter().enumerate() {
        let text = result.text.as_str();

        for caps in DECIMAL_FRAGMENT.captures_iter(text) {
            let integer = caps[1].to_string();
            let digits = caps[2].to_string();
            let Ok(magnitude) = format!("{}.{}", integer, digits).parse::<f64>() else {
                continue;
            };

            // 直後に英字が続く場合（"Speed" など）は半球記号とみなさない
            let marker = caps.get(3).filter(|m| !followed_by_letter(text, m.end()));
            let seed_axis_and_sign = match marker {
                Some(m) => Some(marker_axis(m.as_str())),
                None => classify_unmarked(magnitude, bounds),
            };

            let Some((seed_axis, sign)) = seed_axis_and_sign else {
                continue;
            };
            if seed_axis != axis || magnitude > axis_limit(axis) {
                continue;
            }

            seeds.push(Seed { integer, digits, sign, result_idx });
        }

        for caps in UNDOTTED_FRAGMENT.captures_iter(text) {
            let (Some(run), Some(marker)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if followed_by_letter(text, marker.end()) {
                continue;
            }
            let (seed_axis, sign) = marker_axis(marker.as_str());
            if seed_axis != axis {
                continue;
            }
            if let Some((integer, digits)) = split_undotted(run.as_str(), axis, sign, bounds) {
                seeds.push(Seed { integer, digits, sign, result_idx });
            }
        }
    }

    seeds
}

fn followed_by_letter(text: &str, offset: usize) -> bool {
    text[offset..].chars().next().is_some_and(|c| c.is_alphabetic())
}

fn marker_axis(marker: &str) -> (Axis, f64) {
    match marker.to_ascii_uppercase().as_str() {
        "N" => (Axis::Latitude, 1.0),
        "S" => (Axis::Latitude, -1.0),
        "E" => (Axis::Longitude, 1.0),
        _ => (Axis::Longitude, -1.0),
    }
}

fn axis_limit(axis: Axis) -> f64 {
    match axis {
        Axis::Latitude => 90.0,
        Axis::Longitude => 180.0,
    }
}

/// 小数点のない数字列を `<整数>.<小数>` に区切る
///
/// 整数部は緯度なら1〜2桁、経度なら3〜2桁。範囲に入る区切りがなければ捨てる。
fn split_undotted(run: &str, axis: Axis, sign: f64, bounds: &GeoBounds) -> Option<(String, String)> {
    let widths: &[usize] = match axis {
        Axis::Latitude => &[1, 2],
        Axis::Longitude => &[3, 2],
    };
    widths.iter().filter(|&&w| run.len() > w).find_map(|&w| {
        let (integer, digits) = run.split_at(w);
        let magnitude = format!("{}.{}", integer, digits).parse::<f64>().ok()?;
        let in_bounds = match axis {
            Axis::Latitude => bounds.contains_latitude(sign * magnitude),
            Axis::Longitude => bounds.contains_longitude(sign * magnitude),
        };
        in_bounds.then(|| (integer.to_string(), digits.to_string()))
    })
}

/// 半球記号のない値を範囲で振り分ける（両方／どちらにも入らなければ捨てる）
fn classify_unmarked(magnitude: f64, bounds: &GeoBounds) -> Option<(Axis, f64)> {
    let as_lat = bounds.admits_latitude_magnitude(magnitude);
    let as_lon = bounds.admits_longitude_magnitude(magnitude);
    match (as_lat, as_lon) {
        (true, false) => Some((Axis::Latitude, bounds.default_latitude_sign())),
        (false, true) => Some((Axis::Longitude, bounds.default_longitude_sign())),
        _ => None,
    }
}

fn evaluate_group(
    corpus: &Corpus,
    group: &[&Seed],
    runs: &[Vec<&str>],
    axis: Axis,
    policy: &FragmentPolicy,
) -> Option<Reconstruction> {
    let head = group[0];

    // 最長の断片: 種の小数部か、それを先頭に持つ数字列
    let mut longest = head.digits.clone();
    for seed in group {
        if seed.digits.len() > longest.len() {
            longest = seed.digits.clone();
        }
        if seed.digits.len() < 2 {
            continue;
        }
        for run in runs.iter().flatten() {
            if run.len() > longest.len() && run.starts_with(seed.digits.as_str()) {
                longest = run.to_string();
            }
        }
    }

    if longest.len() < policy.min_digits {
        return None;
    }

    // 小数点を読み落とした `<整数><小数>` も一致として扱う
    let undotted = format!("{}{}", head.integer, longest);
    let consistent = |fragment: &str| {
        fragment.len() >= policy.min_digits
            && (longest.starts_with(fragment)
                || longest.ends_with(fragment)
                || undotted.starts_with(fragment))
    };

    let mut sources = Vec::new();
    for (idx, result) in corpus.results().iter().enumerate() {
        let from_seed = group
            .iter()
            .any(|s| s.result_idx == idx && consistent(&s.digits));
        let from_runs = runs[idx].iter().any(|run| consistent(run));
        if from_seed || from_runs {
            sources.push(result.label());
        }
    }

    if sources.len() < policy.min_sources {
        return None;
    }

    let magnitude = format!("{}.{}", head.integer, longest).parse::<f64>().ok()?;
    if !magnitude.is_finite() || magnitude > axis_limit(axis) {
        return None;
    }

    Some(Reconstruction { value: head.sign * magnitude, digits: longest, sources })
}
