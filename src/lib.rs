//! GPSオーバーレイ画像からの座標抽出
//!
//! 認識ロジック（パターン照合、断片復元、補正表、地名推定、信頼度）は
//! `snapgeo-common` にあり、ここでは画像処理とエンジン呼び出しを担う。

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod scanner;
pub mod sweep;
pub mod variant;

pub use pipeline::Extractor;
pub use snapgeo_common::{ExtractionOutput, MethodTag};
pub use sweep::CancelToken;
