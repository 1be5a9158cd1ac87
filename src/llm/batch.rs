use tracing::{info, warn};

use crate::period::Period;
use crate::store::KeyValueStore;

use super::client::GeminiClient;
use super::item::ShortAnswer;
use super::settings::Settings;

pub const DEFAULT_BATCH_SIZE: usize = 3;

pub fn short_answer_id(period_number: u8, position: usize) -> String {
    format!("ai-saq-{period_number}-{position}")
}

impl GeminiClient {
    /// Generates up to `count` short-answer questions one after another.
    ///
    /// Failed attempts are skipped whatever the fallback policy says, and
    /// survivors keep the 1-based position of the attempt that produced them.
    /// Without a key no attempt is made.
    pub async fn generate_batch<S: KeyValueStore>(
        &self,
        settings: &Settings<S>,
        period: &Period,
        count: usize,
    ) -> Vec<ShortAnswer> {
        if !settings.has_key() {
            warn!(
                requested = count,
                period = period.number,
                "no Gemini API key configured, skipping batch"
            );
            return Vec::new();
        }

        let mut questions = Vec::new();
        for position in 1..=count {
            match self.generate_short_answer(settings, period, None).await {
                Ok(Some(mut question)) => {
                    question.id = Some(short_answer_id(period.number, position));
                    questions.push(question);
                }
                Ok(None) => {
                    warn!(position, period = period.number, "no question generated, skipping");
                }
                Err(err) => {
                    warn!(
                        position,
                        period = period.number,
                        error = %err,
                        "error generating question, skipping"
                    );
                }
            }
        }

        info!(
            requested = count,
            generated = questions.len(),
            period = period.number,
            "batch finished"
        );
        questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn ids_use_period_and_position() {
        assert_eq!(short_answer_id(5, 1), "ai-saq-5-1");
        assert_eq!(short_answer_id(9, 3), "ai-saq-9-3");
    }

    #[tokio::test]
    async fn huge_count_without_key_returns_empty() {
        let client = GeminiClient::with_endpoint("http://127.0.0.1:9/generate").unwrap();
        let settings = Settings::from_sources(MemoryStore::new(), None).unwrap();
        let period = Period::new(4, "The Early Republic", "1800-1848", &["Market Revolution"]);

        let questions = client.generate_batch(&settings, &period, usize::MAX).await;
        assert!(questions.is_empty());
    }
}
