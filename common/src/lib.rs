//! SnapGeo Common Library
//!
//! 認識テキストから座標を取り出す純粋なロジック（I/Oなし）。
//! CLI側は画像の前処理と文字認識エンジンの呼び出しだけを担当する。

pub mod bounds;
pub mod cascade;
pub mod confidence;
pub mod corpus;
pub mod corrections;
pub mod error;
pub mod fragment;
pub mod gazetteer;
pub mod metadata;
pub mod pattern;
pub mod types;

pub use bounds::GeoBounds;
pub use cascade::{retag_escalated, Cascade, Resolution, Stage};
pub use corpus::Corpus;
pub use error::{Error, Result};
pub use fragment::FragmentPolicy;
pub use gazetteer::{Gazetteer, LocationHint};
pub use pattern::{match_patterns, PatternOutcome};
pub use types::{
    ConfidenceLevel, ConfidenceResult, CoordinateCandidate, CoordinateReport, ExtractionOutput,
    MethodTag, NotFoundReport, OverlayMetadata, RecognitionResult,
};
