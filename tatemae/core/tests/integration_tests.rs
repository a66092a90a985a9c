//! Integration tests for the translator façade
//!
//! These tests drive [`Translator`] end to end through its public API:
//! - Input rejection and option coercion
//! - Language detection and intent classification with the local provider
//! - Degradation when a provider fails at either stage
//! - Configuration file → provider selection → translation
//! - Custom lexicons

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use tatemae_core::{
    load_config_with_env, setup_provider, FallbackProvider, Intent, IntentClassification,
    Language, Lexicon, LlmProvider, ProviderError, ProviderSettings, RefineRequest,
    RetryConfig, SelectionState, TranslateOptions, Translator, ERROR_INTENT, ERROR_TEXT,
};

// =============================================================================
// Test Providers
// =============================================================================

/// Returns fixed answers and counts calls
struct ScriptedProvider {
    classification: IntentClassification,
    refinement: Result<String, ProviderError>,
    refine_calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(intent: Intent, confidence: f32, refinement: Result<String, ProviderError>) -> Self {
        Self {
            classification: IntentClassification::new(intent, confidence),
            refinement,
            refine_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn classify_intent(&self, _text: &str) -> Result<IntentClassification, ProviderError> {
        Ok(self.classification)
    }

    async fn refine(&self, _request: &RefineRequest) -> Result<String, ProviderError> {
        self.refine_calls.fetch_add(1, Ordering::SeqCst);
        self.refinement.clone()
    }
}

/// Fails every call
struct BrokenProvider;

#[async_trait]
impl LlmProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    fn model(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn classify_intent(&self, _text: &str) -> Result<IntentClassification, ProviderError> {
        Err(ProviderError::ConnectionFailed("connection refused".into()))
    }

    async fn refine(&self, _request: &RefineRequest) -> Result<String, ProviderError> {
        Err(ProviderError::Timeout)
    }
}

/// Fails with a transient error a fixed number of times, then succeeds
struct FlakyProvider {
    failures_left: AtomicUsize,
    calls: AtomicUsize,
    retry: RetryConfig,
}

impl FlakyProvider {
    fn new(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
            retry: RetryConfig {
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
                ..RetryConfig::default()
            },
        }
    }

    async fn attempt(&self) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderError::RateLimited { retry_after_ms: Some(1) });
        }
        Ok("大変恐縮ではございますが、今回は見送らせていただきます。".to_string())
    }
}

#[async_trait]
impl LlmProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    fn model(&self) -> &str {
        "flaky-1"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn classify_intent(&self, _text: &str) -> Result<IntentClassification, ProviderError> {
        Ok(IntentClassification::new(Intent::Refusal, 0.9))
    }

    async fn refine(&self, _request: &RefineRequest) -> Result<String, ProviderError> {
        self.retry.run("refine", || self.attempt()).await
    }
}

fn local_translator(seed: u64) -> Translator {
    Translator::new(Arc::new(FallbackProvider::new())).with_rng(StdRng::seed_from_u64(seed))
}

fn assert_polite(text: &str) {
    let endings = ["ます", "です", "ございます", "いたします", "存じます"];
    assert!(
        endings.iter().any(|e| text.contains(e)),
        "expected a polite form in {text:?}"
    );
}

// =============================================================================
// Rejection and Coercion
// =============================================================================

#[tokio::test]
async fn test_blank_and_oversized_input_is_rejected() {
    let translator = local_translator(1);
    let options = TranslateOptions::default();
    let oversized = "a".repeat(5_001);

    for text in ["", "   ", oversized.as_str()] {
        let result = translator.translate(text, &options).await;
        assert!(result.is_error(), "input of {} chars", text.len());
        assert_eq!(result.intent, ERROR_INTENT);
        assert_eq!(result.tatemae_text, ERROR_TEXT);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.detected_language, None);
    }
}

#[tokio::test]
async fn test_non_text_payload_is_rejected() {
    let translator = local_translator(1);
    let options = TranslateOptions::with_level("casual");

    for value in [Value::Null, json!(7), json!({"text": "hi"})] {
        let result = translator.translate_value(&value, &options).await;
        assert_eq!(result.intent, "error");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.level, "casual");
        assert!(result.error.is_some());
    }

    let ok = translator
        .translate_value(&json!("Let's talk later"), &options)
        .await;
    assert!(!ok.is_error());
    assert_eq!(ok.intent, "delay");
}

#[tokio::test]
async fn test_level_is_preserved_or_coerced() {
    let translator = local_translator(2);

    for level in ["business", "ultra_polite", "casual"] {
        let result = translator
            .translate("Thanks for the update", &TranslateOptions::with_level(level))
            .await;
        assert_eq!(result.level, level);
    }

    let result = translator
        .translate("Thanks for the update", &TranslateOptions::with_level("royal"))
        .await;
    assert!(!result.is_error());
    assert_eq!(result.level, "business");
}

#[tokio::test]
async fn test_context_and_fidelity_are_coerced() {
    let translator = local_translator(3);

    let options = TranslateOptions::default()
        .with_context("recruiter")
        .with_fidelity("extreme");
    let result = translator.translate("I'm busy this week", &options).await;
    assert_eq!(result.context.as_deref(), Some("recruiter"));
    assert!(!result.is_error());

    let options = TranslateOptions::default().with_context("family");
    let result = translator.translate("I'm busy this week", &options).await;
    assert_eq!(result.context, None);
}

// =============================================================================
// Local Provider End to End
// =============================================================================

#[tokio::test]
async fn test_job_offer_refusal() {
    let translator = local_translator(4);
    let result = translator
        .translate("I'm not interested in this job.", &TranslateOptions::default())
        .await;

    assert_eq!(result.intent, "refusal");
    assert!(result.confidence >= 0.6);
    assert_eq!(result.detected_language, Some(Language::En));
    assert_polite(&result.tatemae_text);
    assert!(!result.tatemae_text.contains('{'));
}

#[tokio::test]
async fn test_language_detection_through_facade() {
    let translator = local_translator(5);
    let options = TranslateOptions::default();

    let ja = translator.translate("この提案には反対です", &options).await;
    assert_eq!(ja.detected_language, Some(Language::Ja));
    assert_eq!(ja.intent, "disagreement");

    let en = translator.translate("Sounds good to me", &options).await;
    assert_eq!(en.detected_language, Some(Language::En));
    assert_eq!(en.intent, "neutral_polite");
}

#[tokio::test]
async fn test_intent_is_stable_across_calls() {
    let translator = local_translator(6);
    let options = TranslateOptions::default();

    let first = translator.translate("We should postpone the launch", &options).await;
    for _ in 0..5 {
        let again = translator.translate("We should postpone the launch", &options).await;
        assert_eq!(again.intent, first.intent);
        assert_eq!(again.confidence, first.confidence);
    }
}

#[tokio::test]
async fn test_outputs_never_contain_placeholders() {
    let translator = local_translator(7);
    let inputs = [
        "No thanks",
        "I disagree",
        "Maybe later",
        "This design is bad",
        "Not for me",
        "OK",
    ];

    for seed_round in 0..4 {
        for input in inputs {
            let text = translator.translate_simple(input, "business").await;
            assert!(!text.is_empty());
            assert!(
                !tatemae_core::lexicon::has_placeholder(&text),
                "round {seed_round}: {text}"
            );
        }
    }
}

#[tokio::test]
async fn test_local_cleanup_is_idempotent_on_outputs() {
    let translator = local_translator(8);
    let text = translator.translate_simple("I have to decline", "ultra_polite").await;
    let cleaned = tatemae_core::provider::fallback::dedupe(&text);
    assert_eq!(cleaned, text);
}

// =============================================================================
// Degradation
// =============================================================================

#[tokio::test]
async fn test_failing_provider_degrades_to_template() {
    let translator = Translator::new(Arc::new(BrokenProvider)).with_rng(StdRng::seed_from_u64(9));
    let result = translator
        .translate("I'm not interested in this job.", &TranslateOptions::default())
        .await;

    assert!(!result.is_error());
    assert_eq!(result.intent, "neutral_polite");
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.detected_language, Some(Language::En));

    let prefixes = ["承知いたしました。", "ご連絡ありがとうございます。", "かしこまりました。"];
    assert!(
        prefixes.iter().any(|p| result.tatemae_text.starts_with(p)),
        "unexpected fallback text {:?}",
        result.tatemae_text
    );
}

#[tokio::test]
async fn test_refine_failure_keeps_filled_template() {
    let provider = Arc::new(ScriptedProvider::new(
        Intent::Delay,
        0.85,
        Err(ProviderError::Http { status: 503, body: "overloaded".into() }),
    ));
    let translator =
        Translator::new(provider.clone()).with_rng(StdRng::seed_from_u64(10));

    let result = translator
        .translate("Can we push this to next month?", &TranslateOptions::default())
        .await;

    assert_eq!(result.intent, "delay");
    assert_eq!(result.confidence, 0.85);
    assert!(!tatemae_core::lexicon::has_placeholder(&result.tatemae_text));
    assert_eq!(provider.refine_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_refinement_keeps_filled_template() {
    let provider = Arc::new(ScriptedProvider::new(Intent::Criticism, 0.7, Ok(String::new())));
    let translator = Translator::new(provider).with_rng(StdRng::seed_from_u64(11));

    let result = translator.translate_simple("The report is sloppy", "business").await;
    assert!(!result.is_empty());
    assert!(result.contains("余地") || result.contains("検討"), "{result}");
}

#[tokio::test]
async fn test_out_of_range_confidence_is_clamped() {
    for (raw, expected) in [(1.7, 1.0), (-0.3, 0.0), (f32::NAN, 0.8)] {
        let provider = ScriptedProvider::new(Intent::Refusal, raw, Ok("今回は辞退いたします。".into()));
        let translator = Translator::new(Arc::new(provider));

        let result = translator.translate("no", &TranslateOptions::default()).await;
        assert_eq!(result.confidence, expected, "raw {raw}");
        assert_eq!(result.tatemae_text, "今回は辞退いたします。");
    }
}

#[tokio::test]
async fn test_transient_refine_errors_are_retried() {
    let provider = Arc::new(FlakyProvider::new(2));
    let translator = Translator::new(provider.clone());

    let result = translator
        .translate("No thanks", &TranslateOptions::with_level("ultra_polite"))
        .await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        result.tatemae_text,
        "大変恐縮ではございますが、今回は見送らせていただきます。"
    );
}

// =============================================================================
// Configuration and Selection
// =============================================================================

#[tokio::test]
async fn test_config_file_drives_provider_selection() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[provider]
kind = "deepseek"
temperature = 0.2

[retry]
max_attempts = 1
"#
    )
    .unwrap();

    // A short key is not usable, so selection must end at the fallback
    let config = load_config_with_env(Some(file.path().to_path_buf()), |name: &str| {
        (name == "DEEPSEEK_API_KEY_CHAT").then(|| "short".to_string())
    })
    .unwrap();

    let setup = setup_provider(&config.provider_settings());
    assert!(setup.is_fallback());
    assert!(matches!(
        setup.selection.first(),
        Some(SelectionState::RemoteUnavailable { .. })
    ));

    let translator = Translator::new(setup.provider);
    assert_eq!(translator.provider_info().provider, "fallback");

    let result = translator.translate("Maybe later", &TranslateOptions::default()).await;
    assert_eq!(result.intent, "delay");
}

#[tokio::test]
async fn test_fallback_only_settings() {
    let setup = setup_provider(&ProviderSettings::fallback_only());
    assert_eq!(setup.selection, vec![SelectionState::FallbackActive]);
    assert!(setup.provider.is_available());
}

// =============================================================================
// Custom Lexicon
// =============================================================================

#[tokio::test]
async fn test_custom_lexicon_is_used() {
    let toml = r#"
[templates]
refusal = ["{closing}、今回は見送ります。"]
disagreement = ["別の考えもございます。"]
delay = ["少しお時間をいただけますでしょうか。"]
disinterest = ["今回は控えさせていただきます。"]
criticism = ["改善の余地がございます。"]
neutral_polite = ["承知しました。"]

[phrases]
closing = ["恐れ入りますが"]
"#;
    let lexicon = Arc::new(Lexicon::from_toml_str(toml).unwrap());
    let translator = Translator::with_lexicon(Arc::new(FallbackProvider::new()), lexicon);

    let result = translator.translate("No thanks", &TranslateOptions::default()).await;
    assert_eq!(result.tatemae_text, "恐れ入りますが、今回は見送ります。");

    let result = translator.translate("OK", &TranslateOptions::default()).await;
    assert_eq!(result.tatemae_text, "承知しました。");
}
