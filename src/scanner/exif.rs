//! EXIF から撮影日時と GPS を読む（バッチ出力の照合用）

use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

fn read_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    Reader::new().read_from_container(&mut bufreader).ok()
}

/// 撮影日時（`YYYY-MM-DDTHH:MM:SS`）
///
/// DateTimeOriginal がなければ DateTime を使う。
pub fn extract_date(path: &Path) -> Option<String> {
    let exif = read_exif(path)?;
    [Tag::DateTimeOriginal, Tag::DateTime]
        .iter()
        .find_map(|tag| exif.get_field(*tag, In::PRIMARY))
        .map(|field| normalize_date(&field.display_value().to_string()))
}

/// 埋め込み GPS（符号付きの度）
pub fn extract_gps(path: &Path) -> Option<(f64, f64)> {
    let exif = read_exif(path)?;
    let latitude = signed_degrees(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
    let longitude = signed_degrees(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
    Some((latitude, longitude))
}

fn signed_degrees(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative: u8) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    let mut degrees = 0.0;
    for (part, divisor) in parts.iter().zip([1.0, 60.0, 3600.0]) {
        if part.denom == 0 {
            return None;
        }
        degrees += part.to_f64() / divisor;
    }

    let hemisphere = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Ascii(values) => values.first().and_then(|v| v.first().copied()),
            _ => None,
        });
    Some(if hemisphere.map(|c| c.to_ascii_uppercase()) == Some(negative) { -degrees } else { degrees })
}

/// EXIF の日時表記を ISO 形式に揃える（解釈できなければそのまま）
fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('"');
    [EXIF_DATE_FORMAT, "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
