//! 座標パターン照合
//!
//! 具体的なものから順に照合する:
//! 1. 緯度経度の組（度分秒 / 10進） → direct_ocr
//! 2. 緯度のみ
//! 3. 経度のみ
//!
//! 組が見つからず片方だけ見つかった場合は `Partial` として
//! 断片復元に引き継ぐ。両方が別々に見つかった場合は pattern_matching。

use crate::corpus::Corpus;
use crate::types::{CoordinateCandidate, MethodTag};
use regex::{Captures, Regex};

/// 片側（緯度または経度）の一致
#[derive(Debug, Clone, PartialEq)]
pub struct HalfMatch {
    /// 符号付きの度
    pub value: f64,
    pub label: String,
}

/// 片側のみの一致
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialCoordinate {
    pub latitude: Option<HalfMatch>,
    pub longitude: Option<HalfMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternOutcome {
    Complete(CoordinateCandidate),
    Partial(PartialCoordinate),
    NoMatch,
}

lazy_static::lazy_static! {
    // 7°33'15.8"S 110°38'38.7"E
    static ref DMS_PAIR: Regex = Regex::new(
        r#"(?i)(\d{1,2})\s*°\s*(\d{1,2})\s*['’′]\s*(\d{1,2}(?:\.\d+)?)\s*(?:"|”|″|'')?\s*([NS])[\s,;]*(\d{1,3})\s*°\s*(\d{1,2})\s*['’′]\s*(\d{1,2}(?:\.\d+)?)\s*(?:"|”|″|'')?\s*([EW])"#
    ).unwrap();
    // 6.26891158S 107.25537723E
    static ref DECIMAL_PAIR: Regex = Regex::new(
        r"(?i)(?:^|[^\d.])(\d{1,2}\.\d+)\s*°?\s*([NS])[\s,;]*(\d{1,3}\.\d+)\s*°?\s*([EW])"
    ).unwrap();
    static ref DECIMAL_LAT: Regex = Regex::new(
        r"(?i)(?:^|[^\d.])(\d{1,2}\.\d+)\s*°?\s*([NS])(?:[^a-z]|$)"
    ).unwrap();
    static ref DECIMAL_LON: Regex = Regex::new(
        r"(?i)(?:^|[^\d.])(\d{1,3}\.\d+)\s*°?\s*([EW])(?:[^a-z]|$)"
    ).unwrap();
    static ref DMS_LAT: Regex = Regex::new(
        r#"(?i)(\d{1,2})\s*°\s*(\d{1,2})\s*['’′]\s*(\d{1,2}(?:\.\d+)?)\s*(?:"|”|″|'')?\s*([NS])(?:[^a-z]|$)"#
    ).unwrap();
    static ref DMS_LON: Regex = Regex::new(
        r#"(?i)(\d{1,3})\s*°\s*(\d{1,2})\s*['’′]\s*(\d{1,2}(?:\.\d+)?)\s*(?:"|”|″|'')?\s*([EW])(?:[^a-z]|$)"#
    ).unwrap();
    static ref COORDINATE_TOKEN: Regex = Regex::new(r"(?i)\d+\.\d+\s*°?\s*[NSEW]").unwrap();
}

/// コーパス全体にパターンを適用する
pub fn match_patterns(corpus: &Corpus) -> PatternOutcome {
    if let Some(candidate) = find_pair(corpus) {
        return PatternOutcome::Complete(candidate);
    }

    let latitude = find_half(corpus, &[&*DMS_LAT, &*DECIMAL_LAT], parse_latitude_caps);
    let longitude = find_half(corpus, &[&*DMS_LON, &*DECIMAL_LON], parse_longitude_caps);

    match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            let candidate = CoordinateCandidate::new(lat.value, lon.value, MethodTag::PatternMatching)
                .with_provenance([lat.label, lon.label]);
            PatternOutcome::Complete(candidate)
        }
        (None, None) => PatternOutcome::NoMatch,
        (latitude, longitude) => PatternOutcome::Partial(PartialCoordinate { latitude, longitude }),
    }
}

/// 座標らしき記述（`7.55S` など）を含むか
pub fn has_coordinate_token(text: &str) -> bool {
    COORDINATE_TOKEN.is_match(text)
}

/// 半球記号から緯度の符号を付ける（S が負）
pub fn signed_latitude(magnitude: f64, hemisphere: &str) -> f64 {
    if hemisphere.eq_ignore_ascii_case("s") { -magnitude } else { magnitude }
}

/// 半球記号から経度の符号を付ける（W が負）
pub fn signed_longitude(magnitude: f64, hemisphere: &str) -> f64 {
    if hemisphere.eq_ignore_ascii_case("w") { -magnitude } else { magnitude }
}

/// 度分秒から変換した値の小数桁（0.1秒 ≒ 0.00003度 より細かくしない）
pub const DMS_DECIMALS: i32 = 6;

/// 度分秒 → 度（小数6桁に丸める）
pub fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> Option<f64> {
    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let scale = 10f64.powi(DMS_DECIMALS);
    Some(((degrees + minutes / 60.0 + seconds / 3600.0) * scale).round() / scale)
}

fn find_pair(corpus: &Corpus) -> Option<CoordinateCandidate> {
    let pairs: [(&Regex, fn(&Captures) -> Option<(f64, f64)>); 2] =
        [(&*DMS_PAIR, parse_dms_pair), (&*DECIMAL_PAIR, parse_decimal_pair)];

    for (regex, parse) in pairs {
        // 個々の結果を先に、次に連結テキスト
        for result in corpus.results() {
            if let Some((lat, lon)) = regex.captures_iter(&result.text).find_map(|c| parse(&c)) {
                return Some(
                    CoordinateCandidate::new(lat, lon, MethodTag::DirectOcr)
                        .with_provenance([result.label()]),
                );
            }
        }
        for caps in regex.captures_iter(corpus.combined()) {
            if let Some((lat, lon)) = parse(&caps) {
                let span = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
                return Some(
                    CoordinateCandidate::new(lat, lon, MethodTag::DirectOcr)
                        .with_provenance(corpus.labels_overlapping(span)),
                );
            }
        }
    }
    None
}

fn find_half(
    corpus: &Corpus,
    regexes: &[&Regex],
    parse: fn(&Captures) -> Option<f64>,
) -> Option<HalfMatch> {
    for regex in regexes {
        for result in corpus.results() {
            if let Some(value) = regex.captures_iter(&result.text).find_map(|c| parse(&c)) {
                return Some(HalfMatch { value, label: result.label() });
            }
        }
    }
    None
}

fn number(caps: &Captures, idx: usize) -> Option<f64> {
    caps.get(idx)?.as_str().parse::<f64>().ok()
}

fn parse_dms_pair(caps: &Captures) -> Option<(f64, f64)> {
    let lat = dms_to_degrees(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)?;
    let lon = dms_to_degrees(number(caps, 5)?, number(caps, 6)?, number(caps, 7)?)?;
    checked_pair(signed_latitude(lat, &caps[4]), signed_longitude(lon, &caps[8]))
}

fn parse_decimal_pair(caps: &Captures) -> Option<(f64, f64)> {
    let lat = signed_latitude(number(caps, 1)?, &caps[2]);
    let lon = signed_longitude(number(caps, 3)?, &caps[4]);
    checked_pair(lat, lon)
}

fn parse_latitude_caps(caps: &Captures) -> Option<f64> {
    let magnitude = if caps.len() > 3 {
        dms_to_degrees(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)?
    } else {
        number(caps, 1)?
    };
    let hemisphere = caps.get(caps.len() - 1)?.as_str();
    let lat = signed_latitude(magnitude, hemisphere);
    (-90.0..=90.0).contains(&lat).then_some(lat)
}

fn parse_longitude_caps(caps: &Captures) -> Option<f64> {
    let magnitude = if caps.len() > 3 {
        dms_to_degrees(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)?
    } else {
        number(caps, 1)?
    };
    let hemisphere = caps.get(caps.len() - 1)?.as_str();
    let lon = signed_longitude(magnitude, hemisphere);
    (-180.0..=180.0).contains(&lon).then_some(lon)
}

fn checked_pair(lat: f64, lon: f64) -> Option<(f64, f64)> {
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}
