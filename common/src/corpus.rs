//! 1リクエスト分の認識結果の集合

use crate::types::RecognitionResult;
use std::ops::Range;

/// 認識結果の集合（走査順を保持）
///
/// `combined()` は全テキストを空白で連結したもの。
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    results: Vec<RecognitionResult>,
    combined: String,
    /// combined 内での各結果の位置（空テキストは含まない）
    spans: Vec<(Range<usize>, usize)>,
}

impl Corpus {
    pub fn new(results: Vec<RecognitionResult>) -> Self {
        let (combined, spans) = join_texts(&results);
        Self { results, combined, spans }
    }

    /// テキストだけから作る（ラベルは `input_<n>`）
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let results = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| RecognitionResult::new(text, "input", (i + 1).to_string()))
            .collect();
        Self::new(results)
    }

    pub fn results(&self) -> &[RecognitionResult] {
        &self.results
    }

    pub fn combined(&self) -> &str {
        &self.combined
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 空でないテキストが1つもないか
    pub fn is_blank(&self) -> bool {
        self.results.iter().all(|r| r.is_blank())
    }

    pub fn labels(&self) -> Vec<String> {
        self.results.iter().map(|r| r.label()).collect()
    }

    pub fn find(&self, label: &str) -> Option<&RecognitionResult> {
        self.results.iter().find(|r| r.label() == label)
    }

    pub fn extend(&mut self, more: Vec<RecognitionResult>) {
        self.results.extend(more);
        let (combined, spans) = join_texts(&self.results);
        self.combined = combined;
        self.spans = spans;
    }

    /// combined 上の範囲に重なる結果のラベル（走査順）
    pub fn labels_overlapping(&self, range: Range<usize>) -> Vec<String> {
        self.spans
            .iter()
            .filter(|(span, _)| span.start < range.end && range.start < span.end)
            .map(|(_, idx)| self.results[*idx].label())
            .collect()
    }
}

fn join_texts(results: &[RecognitionResult]) -> (String, Vec<(Range<usize>, usize)>) {
    let mut combined = String::new();
    let mut spans = Vec::new();
    for (idx, result) in results.iter().enumerate() {
        if result.text.is_empty() {
            continue;
        }
        if !combined.is_empty() {
            combined.push(' ');
        }
        let start = combined.len();
        combined.push_str(&result.text);
        spans.push((start..combined.len(), idx));
    }
    (combined, spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_texts_labels() {
        let corpus = Corpus::from_texts(["a", "b"]);
        assert_eq!(corpus.labels(), vec!["input_1", "input_2"]);
        assert_eq!(corpus.combined(), "a b");
    }

    #[test]
    fn test_empty_texts_kept_but_not_joined() {
        let corpus = Corpus::from_texts(["", "7.5S", ""]);
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.combined(), "7.5S");
        assert!(!corpus.is_blank());
        assert!(Corpus::from_texts(["", " "]).is_blank());
    }

    #[test]
    fn test_extend_recomputes_combined() {
        let mut corpus = Corpus::from_texts(["one"]);
        corpus.extend(vec![RecognitionResult::new("two", "ultra_crop1", "ultra_digits")]);
        assert_eq!(corpus.combined(), "one two");
        assert!(corpus.find("ultra_crop1_ultra_digits").is_some());
    }

    #[test]
    fn test_labels_overlapping() {
        let corpus = Corpus::from_texts(["7.55S", "", "110.64E"]);
        // "7.55S 110.64E"
        assert_eq!(corpus.labels_overlapping(0..5), vec!["input_1"]);
        assert_eq!(corpus.labels_overlapping(3..9), vec!["input_1", "input_3"]);
        assert_eq!(corpus.labels_overlapping(6..13), vec!["input_3"]);
    }
}
