//! Seams for the external text recognizer.
//!
//! The core never runs OCR itself. A recognizer is injected into the
//! pipeline and only used for the name label and for answer-key pages.

use image::RgbImage;
use log::debug;

use crate::config::SheetTemplate;
use crate::error::OmrError;
use crate::grading::answer_key::{AnswerKeyParser, ExtractedKey};
use crate::models::BoxRegion;

/// One run of recognized text
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Recognized text
    pub text: String,
    /// Recognizer confidence in `[0, 1]`
    pub confidence: f32,
    /// Location in the source image
    pub bbox: BoxRegion,
}

impl TextSpan {
    /// Span with full confidence and an empty box
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            bbox: BoxRegion::default(),
        }
    }
}

/// Extracts text spans from an image, in reading order
pub trait TextRecognizer: Send + Sync {
    /// Recognize every text span; an empty list on failure
    fn extract_text(&self, image: &RgbImage) -> Vec<TextSpan>;
}

/// Supplies an answer key from rendered document pages
pub trait AnswerKeyExtractor: Send + Sync {
    /// Extract a key from page images in order
    fn extract_key(&self, pages: &[RgbImage]) -> Result<ExtractedKey, OmrError>;
}

/// Key extractor that recognizes each page and parses the text
pub struct TextAnswerKeyExtractor<R> {
    recognizer: R,
    parser: AnswerKeyParser,
}

impl<R: TextRecognizer> TextAnswerKeyExtractor<R> {
    /// Extractor using the built-in answer patterns
    pub fn new(recognizer: R) -> Result<Self, OmrError> {
        Ok(Self {
            recognizer,
            parser: AnswerKeyParser::new()?,
        })
    }
}

impl<R: TextRecognizer> AnswerKeyExtractor for TextAnswerKeyExtractor<R> {
    fn extract_key(&self, pages: &[RgbImage]) -> Result<ExtractedKey, OmrError> {
        if pages.is_empty() {
            return Err(OmrError::EmptyAnswerKey);
        }
        let texts: Vec<String> = pages
            .iter()
            .map(|page| {
                self.recognizer
                    .extract_text(page)
                    .into_iter()
                    .map(|span| span.text)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        Ok(self.parser.parse_pages(&texts))
    }
}

fn is_hangul_name(text: &str) -> bool {
    let count = text.chars().count();
    (2..=4).contains(&count) && text.chars().all(|c| ('가'..='힣').contains(&c))
}

/// Best-effort name lookup over recognized spans.
///
/// A span containing a label keyword yields the text after the separator
/// on that span, or else the next span. Without a label, the first span
/// of 2 to 4 Hangul syllables is taken.
pub fn find_student_name(spans: &[TextSpan], template: &SheetTemplate) -> Option<String> {
    let keywords: Vec<String> = template
        .name_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();

    for (i, span) in spans.iter().enumerate() {
        let lower = span.text.to_lowercase();
        if !keywords.iter().any(|k| lower.contains(k.as_str())) {
            continue;
        }
        if let Some(value) = span.text.split(template.name_separator).nth(1) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
        if let Some(next) = spans.get(i + 1) {
            let next = next.text.trim();
            if !next.is_empty() {
                return Some(next.to_string());
            }
        }
    }

    let fallback = spans
        .iter()
        .map(|s| s.text.trim())
        .find(|t| is_hangul_name(t))
        .map(str::to_string);
    if fallback.is_none() {
        debug!("no name label among {} spans", spans.len());
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<&'static str>);

    impl TextRecognizer for Fixed {
        fn extract_text(&self, _image: &RgbImage) -> Vec<TextSpan> {
            self.0.iter().map(|t| TextSpan::new(*t)).collect()
        }
    }

    fn spans(texts: &[&str]) -> Vec<TextSpan> {
        texts.iter().map(|t| TextSpan::new(*t)).collect()
    }

    #[test]
    fn test_name_after_separator() {
        let t = SheetTemplate::default();
        assert_eq!(
            find_student_name(&spans(&["OMR", "이름: 김철수", "1"]), &t).as_deref(),
            Some("김철수")
        );
    }

    #[test]
    fn test_name_in_next_span() {
        let t = SheetTemplate::default();
        assert_eq!(
            find_student_name(&spans(&["Name", "Alice Kim"]), &t).as_deref(),
            Some("Alice Kim")
        );
        assert_eq!(
            find_student_name(&spans(&["성명:", "박영희"]), &t).as_deref(),
            Some("박영희")
        );
    }

    #[test]
    fn test_hangul_fallback() {
        let t = SheetTemplate::default();
        assert_eq!(
            find_student_name(&spans(&["2024", "홍길동", "수학"]), &t).as_deref(),
            Some("홍길동")
        );
        assert_eq!(find_student_name(&spans(&["시험지번호다섯", "A"]), &t), None);
    }

    #[test]
    fn test_no_spans() {
        assert_eq!(find_student_name(&[], &SheetTemplate::default()), None);
    }

    #[test]
    fn test_text_key_extractor() {
        let extractor = TextAnswerKeyExtractor::new(Fixed(vec!["정답", "1.②", "2.④"])).unwrap();
        let page = RgbImage::new(8, 8);
        let key = extractor.extract_key(&[page]).unwrap();
        assert_eq!(key.answers.as_slice(), &[2, 4]);
        assert!(key.confidence > 0.8);
    }

    #[test]
    fn test_extractor_without_pages() {
        let extractor = TextAnswerKeyExtractor::new(Fixed(vec![])).unwrap();
        assert!(matches!(extractor.extract_key(&[]), Err(OmrError::EmptyAnswerKey)));
    }
}
