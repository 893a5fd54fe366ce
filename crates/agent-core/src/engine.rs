//! The Decision Engine: composes the prompt, calls the
//! configured provider with bounded retry, and normalises the response
//! into a [`Decision`]. Monkey mode bypasses all of this.

use rand::Rng;
use tracing::warn;
use wayfarer_core_types::{Decision, HistoryEntry, Persona};

use crate::config::DecisionEngineConfig;
use crate::errors::AgentError;
use crate::json_extract::parse_decision;
use crate::monkey::monkey_decision;
use crate::prompt::{assemble_prompt, PageContext};
use crate::provider::LlmProvider;

/// Everything one turn's decision needs, gathered by the kernel's loop
/// body before calling [`DecisionEngine::decide`].
pub struct DecideContext<'a> {
    pub persona: &'a Persona,
    pub mission: &'a str,
    pub page: PageContext<'a>,
    pub history: &'a [HistoryEntry],
    pub failed_targets: &'a [(u32, u32)],
    pub bare_mode: bool,
    pub monkey_mode: bool,
    pub marked_screenshot: &'a [u8],
}

pub struct DecisionEngine<P: LlmProvider> {
    provider: P,
    config: DecisionEngineConfig,
}

impl<P: LlmProvider> DecisionEngine<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: DecisionEngineConfig::default(),
        }
    }

    pub fn with_config(provider: P, config: DecisionEngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &DecisionEngineConfig {
        &self.config
    }

    /// Decide the next action for this turn. Never returns an error: every
    /// failure mode degrades to a `wait` [`Decision`] with an explanatory
    /// thought.
    pub async fn decide(&self, ctx: DecideContext<'_>, rng: &mut impl Rng) -> Decision {
        if ctx.monkey_mode {
            let som = ctx.page.som.cloned().unwrap_or_default();
            return monkey_decision(&som, rng);
        }

        let prompt = assemble_prompt(
            ctx.persona,
            ctx.mission,
            &ctx.page,
            ctx.history,
            ctx.failed_targets,
            ctx.bare_mode,
            &self.config,
        );

        match self.call_with_retry(ctx.marked_screenshot, &prompt).await {
            Ok(text) => match parse_decision(&text) {
                Ok(decision) => decision,
                Err(err) => {
                    warn!(error = %err, "decision engine could not parse a response");
                    Decision::wait("Couldn't make sense of the model's response, waiting a moment.")
                }
            },
            Err(RetryOutcome::RateLimited) => {
                Decision::wait("The model is rate-limited right now, waiting before trying again.")
            }
            Err(RetryOutcome::Other(err)) => {
                warn!(error = %err, "decision engine provider call failed");
                Decision::wait("Ran into a problem asking the model what to do next, waiting a moment.")
            }
        }
    }

    async fn call_with_retry(&self, screenshot: &[u8], prompt: &str) -> Result<String, RetryOutcome> {
        let mut last_was_rate_limited = false;
        for attempt in 1..=self.config.retry_attempts {
            match self.provider.generate(screenshot, prompt).await {
                Ok(text) => return Ok(text),
                Err(AgentError::RateLimited(msg)) => {
                    last_was_rate_limited = true;
                    warn!(attempt, error = %msg, "rate limited, backing off");
                }
                Err(AgentError::Temporary(msg)) => {
                    last_was_rate_limited = false;
                    warn!(attempt, error = %msg, "temporary provider failure, backing off");
                }
                Err(other) => return Err(RetryOutcome::Other(other)),
            }
            if attempt < self.config.retry_attempts {
                crate::metrics::record_decision_retry();
                tokio::time::sleep(self.config.retry_backoff_unit * attempt).await;
            }
        }
        if last_was_rate_limited {
            Err(RetryOutcome::RateLimited)
        } else {
            Err(RetryOutcome::Other(AgentError::Temporary(
                "provider did not recover within the retry budget".into(),
            )))
        }
    }
}

enum RetryOutcome {
    RateLimited,
    Other(AgentError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wayfarer_core_types::{ActionKind, ContextOptions};

    fn persona() -> Persona {
        Persona {
            name: "Bare".into(),
            base_prompt: "base".into(),
            context: ContextOptions::default(),
            voice: None,
        }
    }

    struct AlwaysRateLimited;
    #[async_trait]
    impl LlmProvider for AlwaysRateLimited {
        async fn generate(&self, _s: &[u8], _p: &str) -> Result<String, AgentError> {
            Err(AgentError::RateLimited("quota exceeded".into()))
        }
    }

    struct SucceedsAfterTwoFailures(AtomicU32);
    #[async_trait]
    impl LlmProvider for SucceedsAfterTwoFailures {
        async fn generate(&self, _s: &[u8], _p: &str) -> Result<String, AgentError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(AgentError::Temporary("upstream hiccup".into()))
            } else {
                Ok(r#"{"thought":"recovered","action":"click","targetId":"2"}"#.to_string())
            }
        }
    }

    struct AlwaysInvalidText;
    #[async_trait]
    impl LlmProvider for AlwaysInvalidText {
        async fn generate(&self, _s: &[u8], _p: &str) -> Result<String, AgentError> {
            Ok("not json at all".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_rate_limit_degrades_to_wait_with_acknowledging_thought() {
        let engine = DecisionEngine::new(AlwaysRateLimited);
        let mut rng = StdRng::seed_from_u64(1);
        let page = PageContext { url: "https://x.test", title: "X", som: None };
        let handle = tokio::spawn(async move {
            engine
                .decide(
                    DecideContext {
                        persona: &persona(),
                        mission: "buy shoes",
                        page,
                        history: &[],
                        failed_targets: &[],
                        bare_mode: false,
                        monkey_mode: false,
                        marked_screenshot: &[],
                    },
                    &mut rng,
                )
                .await
        });
        tokio::time::advance(std::time::Duration::from_secs(10)).await;
        let decision = handle.await.unwrap();
        assert_eq!(decision.action, ActionKind::Wait);
        assert!(decision.thought.to_lowercase().contains("rate-limited"));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures_within_retry_budget() {
        let engine = DecisionEngine::new(SucceedsAfterTwoFailures(AtomicU32::new(0)));
        let mut rng = StdRng::seed_from_u64(2);
        let page = PageContext { url: "https://x.test", title: "X", som: None };
        let handle = tokio::spawn(async move {
            engine
                .decide(
                    DecideContext {
                        persona: &persona(),
                        mission: "buy shoes",
                        page,
                        history: &[],
                        failed_targets: &[],
                        bare_mode: false,
                        monkey_mode: false,
                        marked_screenshot: &[],
                    },
                    &mut rng,
                )
                .await
        });
        tokio::time::advance(std::time::Duration::from_secs(10)).await;
        let decision = handle.await.unwrap();
        assert_eq!(decision.action, ActionKind::Click);
        assert_eq!(decision.target_id.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn unparseable_response_degrades_to_wait() {
        let engine = DecisionEngine::new(AlwaysInvalidText);
        let mut rng = StdRng::seed_from_u64(3);
        let page = PageContext { url: "https://x.test", title: "X", som: None };
        let decision = engine
            .decide(
                DecideContext {
                    persona: &persona(),
                    mission: "buy shoes",
                    page,
                    history: &[],
                    failed_targets: &[],
                    bare_mode: false,
                    monkey_mode: false,
                    marked_screenshot: &[],
                },
                &mut rng,
            )
            .await;
        assert_eq!(decision.action, ActionKind::Wait);
    }

    #[tokio::test]
    async fn monkey_mode_never_calls_the_provider() {
        let engine = DecisionEngine::new(AlwaysRateLimited);
        let mut rng = StdRng::seed_from_u64(4);
        let page = PageContext { url: "https://x.test", title: "X", som: None };
        let decision = engine
            .decide(
                DecideContext {
                    persona: &persona(),
                    mission: "buy shoes",
                    page,
                    history: &[],
                    failed_targets: &[],
                    bare_mode: false,
                    monkey_mode: true,
                    marked_screenshot: &[],
                },
                &mut rng,
            )
            .await;
        // AlwaysRateLimited would have forced a wait with a rate-limit
        // thought; monkey mode instead produced its own local decision.
        assert!(!decision.thought.to_lowercase().contains("rate-limited"));
    }
}
