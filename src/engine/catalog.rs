use serde::Serialize;
use std::fmt;

const DIGITS: &str = "0123456789.";
const COORDS: &str = "0123456789.NSEW";
const COORDS_DEGREE: &str = "0123456789.°NSEW-";

/// 認識設定（エンジンモード、ページ分割モード、許可文字）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecognitionConfig {
    pub label: &'static str,
    pub oem: u8,
    pub psm: u8,
    pub whitelist: Option<&'static str>,
}

impl RecognitionConfig {
    const fn new(label: &'static str, oem: u8, psm: u8, whitelist: Option<&'static str>) -> Self {
        Self { label, oem, psm, whitelist }
    }

    /// エンジンに渡す引数
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ];
        if let Some(whitelist) = self.whitelist {
            args.push("-c".to_string());
            args.push(format!("tessedit_char_whitelist={}", whitelist));
        }
        args
    }
}

impl fmt::Display for RecognitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (oem {}, psm {}", self.label, self.oem, self.psm)?;
        if let Some(whitelist) = self.whitelist {
            write!(f, ", {}", whitelist)?;
        }
        write!(f, ")")
    }
}

pub const CATALOG: &[RecognitionConfig] = &[
    // 標準
    RecognitionConfig::new("psm6", 3, 6, None),
    RecognitionConfig::new("psm8", 3, 8, None),
    RecognitionConfig::new("psm7", 3, 7, None),
    RecognitionConfig::new("psm13", 3, 13, None),
    RecognitionConfig::new("psm3", 3, 3, None),
    RecognitionConfig::new("psm4", 3, 4, None),
    RecognitionConfig::new("psm11", 3, 11, None),
    RecognitionConfig::new("sparse", 3, 12, None),
    RecognitionConfig::new("word", 3, 10, None),
    // 許可文字を絞る
    RecognitionConfig::new("digits", 3, 8, Some("0123456789.SE")),
    RecognitionConfig::new("coords", 3, 6, Some("0123456789.NSEW ")),
    RecognitionConfig::new("numbers", 3, 8, Some(DIGITS)),
    RecognitionConfig::new("char", 3, 10, Some(COORDS)),
    RecognitionConfig::new("sparse_coords", 3, 11, Some(COORDS)),
    RecognitionConfig::new("line_digits", 3, 13, Some(DIGITS)),
    RecognitionConfig::new("block_coords", 3, 6, Some(COORDS_DEGREE)),
    // LSTM
    RecognitionConfig::new("lstm_psm6", 1, 6, None),
    RecognitionConfig::new("lstm_psm8", 1, 8, None),
    RecognitionConfig::new("lstm_psm7", 1, 7, None),
    RecognitionConfig::new("lstm_psm13", 1, 13, None),
    RecognitionConfig::new("lstm_sparse", 1, 11, None),
    RecognitionConfig::new("lstm_digits", 1, 8, Some(DIGITS)),
    RecognitionConfig::new("lstm_coords", 1, 6, Some(COORDS)),
    RecognitionConfig::new("lstm_char_coords", 1, 8, Some(COORDS)),
    RecognitionConfig::new("lstm_block_coords", 1, 6, Some(COORDS_DEGREE)),
    RecognitionConfig::new("lstm_line_coords", 1, 7, Some(COORDS_DEGREE)),
    RecognitionConfig::new("lstm_degree_coords", 1, 8, Some("0123456789.NSEW°")),
    // 旧エンジン（学習データがなければ空で返る）
    RecognitionConfig::new("legacy_psm6", 0, 6, None),
    RecognitionConfig::new("legacy_digits", 0, 8, Some(COORDS)),
    RecognitionConfig::new("legacy_sparse", 0, 11, None),
    RecognitionConfig::new("legacy_single", 0, 13, None),
    RecognitionConfig::new("combined_psm6", 2, 6, None),
    RecognitionConfig::new("combined_digits", 2, 8, Some(DIGITS)),
    // 追加処理向け
    RecognitionConfig::new("ultra_digits", 3, 8, Some(DIGITS)),
    RecognitionConfig::new("ultra_coords", 3, 6, Some(COORDS)),
    RecognitionConfig::new("ultra_sparse", 3, 12, None),
    RecognitionConfig::new("extreme_digits", 1, 8, Some(DIGITS)),
    RecognitionConfig::new("extreme_coords", 1, 6, Some(COORDS)),
    RecognitionConfig::new("extreme_single", 1, 13, None),
    RecognitionConfig::new("extreme_sparse", 1, 11, None),
];

pub fn catalog() -> &'static [RecognitionConfig] {
    CATALOG
}

pub fn find_config(label: &str) -> Option<&'static RecognitionConfig> {
    CATALOG.iter().find(|c| c.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_unique_labels() {
        assert_eq!(CATALOG.len(), 40);
        let mut labels: Vec<_> = CATALOG.iter().map(|c| c.label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), CATALOG.len());
    }

    #[test]
    fn test_catalog_modes_are_valid() {
        for config in CATALOG {
            assert!(config.oem <= 3, "{}", config);
            assert!(config.psm <= 13, "{}", config);
        }
    }

    #[test]
    fn test_args_with_whitelist() {
        let config = find_config("numbers").unwrap();
        assert_eq!(
            config.args(),
            vec!["--oem", "3", "--psm", "8", "-c", "tessedit_char_whitelist=0123456789."]
        );
    }

    #[test]
    fn test_args_without_whitelist() {
        assert_eq!(find_config("psm6").unwrap().args(), vec!["--oem", "3", "--psm", "6"]);
        assert!(find_config("unknown").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(find_config("lstm_psm7").unwrap().to_string(), "lstm_psm7 (oem 1, psm 7)");
    }
}
