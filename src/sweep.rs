//! 認識スイープ
//!
//! (バリアント × 設定) の全組み合わせについてエンジンを1回ずつ呼ぶ。
//! 呼び出しは上限付きのワーカープールに投げ、結果はチャネルで回収する。
//! 途中で打ち切らない（どの設定の出力が断片復元に効くか分からないため）。

use crate::engine::{RecognitionConfig, TextRecognizer};
use crate::error::{Result, SnapGeoError};
use crate::variant::ImageVariant;
use rayon::{ThreadPool, ThreadPoolBuilder};
use snapgeo_common::RecognitionResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// リクエスト単位の中断フラグ（期限付き）
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.is_expired()
    }
}

/// 認識用ワーカープール（リクエスト間で共有）
#[derive(Clone)]
pub struct RecognitionSweep {
    pool: Arc<ThreadPool>,
    workers: usize,
}

impl RecognitionSweep {
    pub fn new(max_workers: usize) -> Result<Self> {
        let workers = max_workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("snapgeo-ocr-{}", i))
            .build()
            .map_err(|e| SnapGeoError::Config(format!("ワーカープールを作成できません: {}", e)))?;
        Ok(Self { pool: Arc::new(pool), workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 全組み合わせを認識する
    ///
    /// 結果は (バリアント順, 設定順) に並べて返す。エンジンの失敗は空文字として残す。
    /// 中断された場合は途中の結果を捨てて `Cancelled` を返す。
    pub fn run(
        &self,
        engine: &dyn TextRecognizer,
        variants: &[ImageVariant],
        configs: &[RecognitionConfig],
        cancel: &CancelToken,
    ) -> Result<Vec<RecognitionResult>> {
        let started = Instant::now();
        let (tx, rx) = mpsc::channel();

        self.pool.scope(|scope| {
            for (vi, variant) in variants.iter().enumerate() {
                for (ci, config) in configs.iter().enumerate() {
                    let tx = tx.clone();
                    scope.spawn(move |_| {
                        if cancel.is_cancelled() {
                            return;
                        }
                        let text = match engine.recognize(variant, config) {
                            Ok(text) => text,
                            Err(e) => {
                                debug!(variant = %variant.label, config = config.label, error = %e, "認識失敗（空文字として扱う）");
                                String::new()
                            }
                        };
                        let result = RecognitionResult::new(text, variant.label.as_str(), config.label);
                        let _ = tx.send((vi, ci, result));
                    });
                }
            }
        });
        drop(tx);

        if cancel.is_cancelled() {
            return Err(SnapGeoError::Cancelled);
        }

        let mut collected: Vec<(usize, usize, RecognitionResult)> = rx.into_iter().collect();
        collected.sort_by_key(|(vi, ci, _)| (*vi, *ci));
        let results: Vec<RecognitionResult> = collected.into_iter().map(|(_, _, r)| r).collect();

        info!(
            calls = results.len(),
            empty = results.iter().filter(|r| r.is_blank()).count(),
            workers = self.workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "認識スイープ完了"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::find_config;
    use crate::variant::{generate, solid};
    use image::DynamicImage;
    use std::sync::atomic::AtomicUsize;

    struct Counting {
        calls: AtomicUsize,
    }

    impl TextRecognizer for Counting {
        fn check_available(&self) -> Result<()> {
            Ok(())
        }

        fn recognize(&self, variant: &ImageVariant, config: &RecognitionConfig) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if config.label == "psm8" {
                return Err(SnapGeoError::Recognition("boom".into()));
            }
            Ok(format!("{}:{}", variant.label, config.label))
        }
    }

    fn configs() -> Vec<RecognitionConfig> {
        ["psm6", "psm8", "digits"].iter().map(|l| *find_config(l).unwrap()).collect()
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
        assert!(!token.is_expired());

        assert!(CancelToken::with_deadline(Duration::ZERO).is_expired());
    }

    #[test]
    fn test_sweep_covers_every_pair_in_order() {
        let variants = generate(&DynamicImage::ImageRgb8(solid(40, 30, 200)), false);
        let engine = Counting { calls: AtomicUsize::new(0) };
        let sweep = RecognitionSweep::new(4).unwrap();

        let results = sweep.run(&engine, &variants, &configs(), &CancelToken::new()).unwrap();

        assert_eq!(results.len(), variants.len() * 3);
        assert_eq!(engine.calls.load(Ordering::SeqCst), variants.len() * 3);
        assert_eq!(results[0].label(), "full_psm6");
        assert_eq!(results[0].text, "full:psm6");
        // 失敗した呼び出しは空文字で残る
        assert_eq!(results[1].label(), "full_psm8");
        assert_eq!(results[1].text, "");
        assert_eq!(results[3].variant_label, variants[1].label);
    }

    #[test]
    fn test_cancelled_sweep_discards_results() {
        let variants = generate(&DynamicImage::ImageRgb8(solid(40, 30, 200)), false);
        let engine = Counting { calls: AtomicUsize::new(0) };
        let sweep = RecognitionSweep::new(2).unwrap();
        let token = CancelToken::new();
        token.cancel();

        let err = sweep.run(&engine, &variants, &configs(), &token).unwrap_err();
        assert!(matches!(err, SnapGeoError::Cancelled));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(RecognitionSweep::new(0).unwrap().workers(), 1);
    }
}
