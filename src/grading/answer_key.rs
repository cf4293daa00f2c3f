//! Answer keys from recognized text.
//!
//! Text comes from an external recognizer (one string per page). Pattern
//! families are tried in priority order and the first family to produce a
//! question number keeps it; later matches for the same number are
//! discarded without notice.

use std::collections::BTreeMap;

use log::{debug, info};
use regex::Regex;
use serde::Serialize;

use crate::error::OmrError;
use crate::models::AnswerKey;

/// Keywords marking a page as an answer section
pub const ANSWER_KEYWORDS: [&str; 10] = [
    "정답", "답안", "답", "Answer", "ANSWER", "정답표", "모범답안", "채점기준", "답안지", "해답",
];

/// Pattern families, highest priority first; group 1 is the question
/// number and group 2 the answer
pub const ANSWER_PATTERNS: [&str; 6] = [
    // 1.③  1번③  1)③
    r"(\d+)\s*[.번\)]\s*([①②③④⑤])",
    // 1.3  1번3  1)3  1:3
    r"(\d+)\s*[.번\):]\s*(\d)",
    // (1)③  (1)3
    r"\((\d+)\)\s*([①②③④⑤\d])",
    // 1 ③
    r"(\d+)\s+([①②③④⑤])",
    // 1 3
    r"(\d+)\s+([1-5])",
    // 1③2①3④
    r"(\d+)([①②③④⑤])",
];

const RAW_TEXT_LIMIT: usize = 2000;

/// Value of a circled digit ①..⑩
pub fn circled_digit(c: char) -> Option<u8> {
    match c {
        '①'..='⑩' => Some((c as u32 - '①' as u32 + 1) as u8),
        _ => None,
    }
}

fn answer_value(token: &str) -> Option<u8> {
    let mut chars = token.chars();
    let first = chars.next()?;
    if chars.next().is_none() {
        if let Some(v) = circled_digit(first) {
            return Some(v);
        }
    }
    token.parse::<u8>().ok()
}

/// Key recovered from one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedKey {
    /// Answers for questions `1..=max`, gaps filled with 0
    pub answers: AnswerKey,
    /// Every question number that was found
    pub answer_map: BTreeMap<u32, u8>,
    /// Heuristic extraction confidence in `[0, 1]`; informational only
    pub confidence: f32,
    /// Recognized text, truncated
    pub raw_text: String,
}

impl ExtractedKey {
    /// Number of questions in the key
    pub fn total_questions(&self) -> usize {
        self.answers.len()
    }
}

/// Pattern-based answer-key parser
#[derive(Debug, Clone)]
pub struct AnswerKeyParser {
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl AnswerKeyParser {
    /// Parser with the built-in keywords and pattern families
    pub fn new() -> Result<Self, OmrError> {
        Self::with_rules(&ANSWER_KEYWORDS, &ANSWER_PATTERNS)
    }

    /// Parser with custom keywords and patterns (priority order)
    pub fn with_rules(keywords: &[&str], patterns: &[&str]) -> Result<Self, OmrError> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            patterns,
        })
    }

    /// Whether the text mentions an answer-section keyword (case-insensitive)
    pub fn contains_answer_section(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Question number to answer; answers outside 1..=10 are ignored
    pub fn parse_text(&self, text: &str) -> BTreeMap<u32, u8> {
        let mut answers = BTreeMap::new();
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                let (Some(q), Some(a)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let Ok(question) = q.as_str().parse::<u32>() else {
                    continue;
                };
                let Some(answer) = answer_value(a.as_str()) else {
                    continue;
                };
                if (1..=10).contains(&answer) {
                    answers.entry(question).or_insert(answer);
                }
            }
        }
        answers
    }

    /// Parse one document given its recognized text, one entry per page.
    ///
    /// Pages mentioning an answer keyword are parsed and merged, later
    /// pages overriding earlier ones. When that yields nothing, the whole
    /// document is parsed as one text.
    pub fn parse_pages<S: AsRef<str>>(&self, pages: &[S]) -> ExtractedKey {
        let mut found = BTreeMap::new();
        for (idx, page) in pages.iter().enumerate() {
            let page = page.as_ref();
            if self.contains_answer_section(page) {
                info!("answer section found on page {}", idx + 1);
                found.extend(self.parse_text(page));
            }
        }

        let full_text = pages.iter().map(|p| p.as_ref()).collect::<Vec<&str>>().join(" ");
        if found.is_empty() {
            info!("no explicit answer section, parsing all pages");
            found = self.parse_text(&full_text);
        }

        let answers = match found.keys().next_back() {
            Some(&max) => (1..=max).map(|q| found.get(&q).copied().unwrap_or(0)).collect(),
            None => Vec::new(),
        };
        let confidence = self.confidence(&found, &full_text);
        debug!("answer key: {} questions, confidence {confidence:.2}", answers.len());

        ExtractedKey {
            answers: AnswerKey::new(answers),
            answer_map: found,
            confidence,
            raw_text: full_text.chars().take(RAW_TEXT_LIMIT).collect(),
        }
    }

    /// `clamp(0.7 - 0.3 * gap_ratio + 0.2 * keyword_found, 0, 1)`, where
    /// gaps are counted between the smallest and largest question found
    pub fn confidence(&self, answers: &BTreeMap<u32, u8>, full_text: &str) -> f32 {
        let (Some(&first), Some(&last)) = (answers.keys().next(), answers.keys().next_back()) else {
            return 0.0;
        };
        let expected = (last - first + 1) as f32;
        let gap_ratio = (expected - answers.len() as f32) / expected;
        let bonus = if self.contains_answer_section(full_text) { 0.2 } else { 0.0 };
        (0.7 - 0.3 * gap_ratio + bonus).clamp(0.0, 1.0)
    }
}
