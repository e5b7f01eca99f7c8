//! オーバーレイの付帯情報（高度・速度・方位）

use crate::types::OverlayMetadata;
use regex::Regex;

lazy_static::lazy_static! {
    static ref ALTITUDE: Regex =
        Regex::new(r"(?i)altitude\s*:?\s*(\d+(?:\.\d+)?)\s*m|(\d+(?:\.\d+)?)\s*msnm").unwrap();
    static ref SPEED: Regex =
        Regex::new(r"(?i)speed\s*:?\s*(\d+(?:\.\d+)?)\s*km/?h").unwrap();
    // 座標の小数（7.55°S）は方位として扱わない
    static ref DIRECTION: Regex =
        Regex::new(r"(?i)(?:^|[^\d.])(\d{1,3})\s*°\s*([NSEW]{1,3})(?:[^a-z]|$)").unwrap();
}

pub fn extract_metadata(text: &str) -> OverlayMetadata {
    OverlayMetadata {
        altitude: extract_altitude(text),
        speed: extract_speed(text),
        direction: extract_direction(text),
    }
}

pub fn extract_altitude(text: &str) -> Option<f64> {
    ALTITUDE.captures_iter(text).find_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    })
}

pub fn extract_speed(text: &str) -> Option<f64> {
    SPEED.captures(text).and_then(|caps| caps[1].parse().ok())
}

pub fn extract_direction(text: &str) -> Option<String> {
    DIRECTION
        .captures(text)
        .map(|caps| format!("{}° {}", &caps[1], caps[2].to_ascii_uppercase()))
}
