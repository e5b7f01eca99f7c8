//! 文字認識エンジンとの境界
//!
//! エンジン本体は外部プログラム。ここではバリアント1枚と設定1つを渡して
//! テキストを受け取るだけ。

mod catalog;
mod tesseract;

pub use catalog::{catalog, find_config, RecognitionConfig, CATALOG};
pub use tesseract::TesseractEngine;

use crate::error::Result;
use crate::variant::ImageVariant;

pub trait TextRecognizer: Send + Sync {
    /// エンジンが使えるか（使えなければ EngineUnavailable）
    fn check_available(&self) -> Result<()>;

    /// 1回分の認識。失敗は呼び出し側で空文字として扱う
    fn recognize(&self, variant: &ImageVariant, config: &RecognitionConfig) -> Result<String>;
}
