//! Narrative production with templated fallback.

use super::fallback::deterministic_summary;
use super::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::config::{AnalysisConfig, ModelConfig};
use crate::llm::{CompletionClient, CompletionRequest};
use crate::models::{Narrative, NarrativeSource, PeriodAggregate};
use chrono::{DateTime, Datelike, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Turns period aggregates into a narrative. Never fails.
pub struct NarrativeProducer {
    client: Option<Arc<dyn CompletionClient>>,
    max_tokens: u32,
    temperature: f32,
    increase_threshold: usize,
}

impl NarrativeProducer {
    /// Without a client every narrative comes from the template.
    pub fn new(
        client: Option<Arc<dyn CompletionClient>>,
        model: &ModelConfig,
        analysis: &AnalysisConfig,
    ) -> Self {
        Self {
            client,
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            increase_threshold: analysis.increase_threshold,
        }
    }

    /// Name of the model in use, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.client.as_deref().map(|c| c.model_name())
    }

    /// The templated narrative for these aggregates at `now`.
    pub fn fallback(&self, aggregates: &[PeriodAggregate], now: DateTime<Utc>) -> Narrative {
        Narrative {
            text: deterministic_summary(aggregates, now.month(), self.increase_threshold),
            source: NarrativeSource::Fallback,
        }
    }

    /// Ask the completion service once; on any failure use the template.
    pub async fn produce(&self, aggregates: &[PeriodAggregate], now: DateTime<Utc>) -> Narrative {
        let Some(client) = self.client.as_deref() else {
            info!("No completion service configured, using templated summary");
            return self.fallback(aggregates, now);
        };

        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: build_prompt(aggregates),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        match client.complete(&request).await {
            Ok(text) => {
                info!("Narrative generated by {}", client.model_name());
                Narrative {
                    text,
                    source: NarrativeSource::Ai,
                }
            }
            Err(e) => {
                warn!("Completion failed, using templated summary: {}", e);
                self.fallback(aggregates, now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::build_aggregate;
    use crate::llm::{ChatCompletionClient, CompletionError};
    use crate::models::{Severity, Sighting};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records requests and answers with a canned result.
    struct ScriptedClient {
        answer: Option<String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(request.clone());
            self.answer.clone().ok_or(CompletionError::Empty)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap()
    }

    fn aggregates() -> Vec<PeriodAggregate> {
        let sightings: Vec<_> = (0..25)
            .map(|_| Sighting {
                species: "galeb".to_string(),
                severity: Severity::High,
                created_at: now(),
            })
            .collect();
        vec![
            build_aggregate("week", sightings[..4].to_vec(), vec![], vec![], vec![]),
            build_aggregate("month", sightings, vec![], vec![], vec![]),
        ]
    }

    fn producer(client: Option<Arc<dyn CompletionClient>>) -> NarrativeProducer {
        NarrativeProducer::new(client, &ModelConfig::default(), &AnalysisConfig::default())
    }

    #[tokio::test]
    async fn test_ai_narrative_used_on_success() {
        let client = Arc::new(ScriptedClient {
            answer: Some("Gull numbers are climbing.".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let shared: Arc<dyn CompletionClient> = client.clone();
        let producer = producer(Some(shared));

        let narrative = producer.produce(&aggregates(), now()).await;
        assert_eq!(narrative.source, NarrativeSource::Ai);
        assert_eq!(narrative.text, "Gull numbers are climbing.");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system, SYSTEM_PROMPT);
        assert_eq!(seen[0].user, build_prompt(&aggregates()));
        assert_eq!(seen[0].max_tokens, 1500);
        assert_eq!(seen[0].temperature, 0.7);
    }

    #[tokio::test]
    async fn test_client_error_falls_back() {
        let client: Arc<dyn CompletionClient> = Arc::new(ScriptedClient {
            answer: None,
            seen: Mutex::new(Vec::new()),
        });
        let producer = producer(Some(client));

        let narrative = producer.produce(&aggregates(), now()).await;
        assert_eq!(narrative.source, NarrativeSource::Fallback);
        assert!(narrative.text.contains("Trend: increased activity"));
        assert!(narrative.text.contains("Seasonal note (summer):"));
    }

    #[tokio::test]
    async fn test_no_client_uses_template() {
        let producer = producer(None);
        assert!(producer.model_name().is_none());

        let narrative = producer.produce(&aggregates(), now()).await;
        assert_eq!(narrative.source, NarrativeSource::Fallback);
    }

    #[tokio::test]
    async fn test_non_success_status_matches_template_exactly() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let model = ModelConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".to_string()),
            ..ModelConfig::default()
        };
        let client: Arc<dyn CompletionClient> =
            Arc::new(ChatCompletionClient::from_config(&model).unwrap().unwrap());
        let producer = NarrativeProducer::new(
            Some(client),
            &model,
            &AnalysisConfig::default(),
        );

        let aggregates = aggregates();
        let narrative = producer.produce(&aggregates, now()).await;

        assert_eq!(narrative.source, NarrativeSource::Fallback);
        assert_eq!(narrative.text, deterministic_summary(&aggregates, 7, 20));
    }
}
