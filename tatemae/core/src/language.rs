//! Source Language Detection
//!
//! Script-based detection, first match wins:
//! 1. any Hiragana or Katakana code point → Japanese
//! 2. any CJK unified ideograph → Chinese
//! 3. anything else (including empty input) → English

use crate::types::Language;

/// Hiragana block
const HIRAGANA: std::ops::RangeInclusive<char> = '\u{3040}'..='\u{309F}';
/// Katakana block
const KATAKANA: std::ops::RangeInclusive<char> = '\u{30A0}'..='\u{30FF}';
/// CJK Unified Ideographs block
const CJK_IDEOGRAPHS: std::ops::RangeInclusive<char> = '\u{4E00}'..='\u{9FFF}';

/// Whether the character is Hiragana or Katakana
#[must_use]
pub fn is_kana(c: char) -> bool {
    HIRAGANA.contains(&c) || KATAKANA.contains(&c)
}

/// Whether the character is a CJK unified ideograph
#[must_use]
pub fn is_cjk_ideograph(c: char) -> bool {
    CJK_IDEOGRAPHS.contains(&c)
}

/// Detect the source language of `text`
///
/// Kanji alone is not enough for Japanese: running Japanese prose almost
/// always contains kana, so ideographs without kana are read as Chinese.
#[must_use]
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_kana) {
        Language::Ja
    } else if text.chars().any(is_cjk_ideograph) {
        Language::Zh
    } else {
        Language::En
    }
}
