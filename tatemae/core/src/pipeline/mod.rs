//! Translation Pipeline
//!
//! Four stages run strictly in sequence over one [`TranslationState`]:
//!
//! ```text
//! detect language → classify intent → fill template → refine
//!                     (provider)        (lexicon)      (provider)
//! ```
//!
//! Provider stages degrade instead of failing (see [`stages`]). The random
//! source used for template selection is locked only inside the fill stage,
//! never across an await point.

pub mod stages;
pub mod state;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info_span, Instrument};

use crate::lexicon::Lexicon;
use crate::provider::LlmProvider;

pub use stages::PipelineError;
pub use state::{Degradation, Stage, StateError, TranslationRequest, TranslationState};

/// Runs translation requests against one provider and lexicon
pub struct Pipeline {
    provider: Arc<dyn LlmProvider>,
    lexicon: Arc<Lexicon>,
    rng: Mutex<StdRng>,
}

impl Pipeline {
    /// Create a pipeline with an entropy-seeded random source
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, lexicon: Arc<Lexicon>) -> Self {
        Self::with_rng(provider, lexicon, StdRng::from_entropy())
    }

    /// Create a pipeline with a caller-supplied random source
    #[must_use]
    pub fn with_rng(provider: Arc<dyn LlmProvider>, lexicon: Arc<Lexicon>, rng: StdRng) -> Self {
        Self {
            provider,
            lexicon,
            rng: Mutex::new(rng),
        }
    }

    /// Active provider
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Active lexicon
    #[must_use]
    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    /// Run all four stages
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] only for pipeline-fatal failures; provider
    /// trouble shows up in [`TranslationState::degradations`] instead.
    pub async fn run(&self, request: TranslationRequest) -> Result<TranslationState, PipelineError> {
        let span = info_span!(
            "pipeline",
            provider = self.provider.name(),
            level = %request.level(),
        );

        async move {
            let mut state = TranslationState::new(request);

            stages::detect(&mut state)?;
            stages::classify(&mut state, self.provider.as_ref()).await?;
            {
                let mut rng = self.rng.lock();
                stages::fill(&mut state, &self.lexicon, &mut *rng)?;
            }
            stages::refine(&mut state, self.provider.as_ref()).await?;

            debug!(degradations = state.degradations().len(), "Pipeline complete");
            Ok(state)
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}
