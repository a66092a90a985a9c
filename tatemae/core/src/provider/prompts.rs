//! Prompt builders and response parsing for chat-completion backends

use std::fmt::Write as _;

use tracing::warn;

use super::traits::{IntentClassification, RefineRequest};
use crate::types::{FidelityLevel, Intent};

/// Confidence assumed when the classifier omits or garbles its score
pub const DEFAULT_CONFIDENCE: f32 = 0.8;

/// System message for intent classification
pub const CLASSIFY_SYSTEM_PROMPT: &str = "You are an expert at analyzing communication intent.";

/// System message for the rewrite step
pub const REFINE_SYSTEM_PROMPT: &str = "あなたは京都の老舗商人のような建前表現の達人です。\
表面的には完璧に丁寧ですが、巧妙に本音を隠します。\
元のメッセージの具体的な内容は必ず保持してください。";

/// Temperature used for the rewrite step
pub const REFINE_TEMPERATURE: f32 = 0.7;

/// Build the user message asking for a two-line classification
#[must_use]
pub fn classification_prompt(text: &str) -> String {
    let mut prompt = String::from(
        "Analyze the following message and classify its intent into one of these categories:\n",
    );
    for intent in Intent::ALL {
        let _ = writeln!(prompt, "- {}: {}", intent.as_str(), intent.definition());
    }
    let _ = write!(
        prompt,
        "\nMessage: \"{text}\"\n\n\
         Respond with ONLY the category name and a confidence score (0-1) in this format:\n\
         category: <category_name>\n\
         confidence: <score>\n\n\
         Example:\n\
         category: refusal\n\
         confidence: 0.95"
    );
    prompt
}

/// Parse a `category:` / `confidence:` reply
///
/// Never fails: an unknown category becomes `neutral_polite` and a bad score
/// becomes [`DEFAULT_CONFIDENCE`]. Range clamping is left to the caller.
#[must_use]
pub fn parse_classification(reply: &str) -> IntentClassification {
    let mut category: Option<&str> = None;
    let mut confidence = DEFAULT_CONFIDENCE;

    for line in reply.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("category:") {
            category = Some(value.trim());
        } else if let Some(value) = line.strip_prefix("confidence:") {
            confidence = value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|c| c.is_finite())
                .unwrap_or(DEFAULT_CONFIDENCE);
        }
    }

    let intent = match category.map(str::parse::<Intent>) {
        Some(Ok(intent)) => intent,
        _ => {
            warn!(
                category = category.unwrap_or("<missing>"),
                "Invalid intent in classifier reply, defaulting to neutral_polite"
            );
            Intent::NeutralPolite
        }
    };

    IntentClassification::new(intent, confidence)
}

fn fidelity_instruction(fidelity: FidelityLevel) -> &'static str {
    match fidelity {
        FidelityLevel::High => {
            "忠実度: 高。婉曲表現は最小限にとどめ、元のメッセージを率直かつ丁寧に言い換えてください。\
             意味が読み手に確実に伝わることを優先します。"
        }
        FidelityLevel::Medium => {
            "忠実度: 中。元の意味が推測できる程度の間接表現と、十分な丁寧さのバランスを取ってください。"
        }
        FidelityLevel::Low => {
            "忠実度: 低。文字通りの意味が失われても構わないので、最大限に遠回しで曖昧な表現にしてください。"
        }
    }
}

/// Build the user message for the rewrite step
#[must_use]
pub fn refine_prompt(request: &RefineRequest) -> String {
    format!(
        "あなたは京都の老舗の商人のような、日本語の建前表現の達人です。\n\n\
         【重要】元のメッセージの具体的な内容やニュアンスを保ちながら、表面的には非常に丁寧で間接的な表現に変換してください。\n\n\
         元のメッセージ: \"{input}\"\n\
         意図カテゴリ: {intent}\n\
         希望する丁寧さ: {level}\n\
         下書き: {draft}\n\
         {fidelity}\n\n\
         【建前表現の原則】:\n\
         1. 表面的には最大限に丁寧で謙虚に見える\n\
         2. 元のメッセージの具体的な対象や文脈は、曖昧にしつつも残す\n\
         3. 批判は「褒める」形式で、拒否は「検討させていただきます」のような言い回しで表現する\n\
         4. 直接的な「NO」は言わず、遠回しに不可能性を示唆する\n\
         5. 責任の所在をぼかし、状況や都合のせいにする\n\
         6. 文法的に正しい日本語にする（同じ語尾や助詞の重複は禁止）\n\n\
         建前表現のみを出力してください:",
        input = request.input_text,
        intent = request.intent.as_str(),
        level = request.level.description_ja(),
        draft = request.filled_template,
        fidelity = fidelity_instruction(request.fidelity),
    )
}

/// Trim a model reply and peel off wrapping quotes
///
/// ASCII double quotes, single quotes, then Japanese corner brackets are
/// removed from both ends in that order.
#[must_use]
pub fn strip_wrapping_quotes(reply: &str) -> &str {
    reply
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim_matches('「')
        .trim_matches('」')
}
