use anyhow::anyhow;
use tracing::{debug, info};
use uuid::Uuid;

use gazette_domain::id::SummaryId;

use crate::domain::repository::{
    MessageRepository, SummaryGeneration, SummaryRepository, TextGenerator,
};
use crate::domain::run_context::SummaryRunContext;
use crate::domain::summary::{
    GenerateOutcome, InsertOutcome, ONELINER_SYSTEM_PROMPT, ONELINER_TEMPERATURE,
    TOPICS_SYSTEM_PROMPT, TOPICS_TEMPERATURE, build_summary_input, normalize_oneliner,
    oneliner_input, parse_topics,
};
use crate::domain::types::{Community, Summary};
use crate::error::CronServiceError;

/// Idempotent generator: at most one summary row per (community, trigger key), even
/// when invocations race. The unique constraint behind `insert_if_absent` decides.
pub struct GenerateSummaryUseCase<M, S, G>
where
    M: MessageRepository,
    S: SummaryRepository,
    G: TextGenerator,
{
    pub messages: M,
    pub summaries: S,
    pub generator: G,
    pub min_messages: u64,
    /// Upper bound on each text-generation call.
    pub call_timeout: std::time::Duration,
}

impl<M, S, G> GenerateSummaryUseCase<M, S, G>
where
    M: MessageRepository,
    S: SummaryRepository,
    G: TextGenerator,
{
    pub async fn execute(
        &self,
        community: &Community,
        run: &SummaryRunContext,
    ) -> Result<GenerateOutcome, CronServiceError> {
        let message_count = self
            .messages
            .count_in_window(community.id, run.window_start, run.window_end)
            .await?;
        if message_count < self.min_messages {
            return Ok(GenerateOutcome::NotEnoughMessages { message_count });
        }

        if let Some(existing) = self
            .summaries
            .find_for_trigger(community.id, &run.trigger_key)
            .await?
        {
            return Ok(existing_outcome(&existing));
        }

        let recent = self
            .messages
            .list_in_window(community.id, run.window_start, run.window_end)
            .await?;
        // The window may have shrunk since the count.
        if (recent.len() as u64) < self.min_messages {
            return Ok(GenerateOutcome::NotEnoughMessages {
                message_count: recent.len() as u64,
            });
        }
        let input = build_summary_input(&recent);
        if input.is_empty() {
            return Ok(GenerateOutcome::NotEnoughMessages {
                message_count: recent.len() as u64,
            });
        }

        let topics_text = self
            .complete(
                TOPICS_SYSTEM_PROMPT,
                &format!("Summarize this chat:\n\n{input}"),
                TOPICS_TEMPERATURE,
            )
            .await?;
        if topics_text.trim().is_empty() {
            return Err(CronServiceError::Generation(
                "empty response from text generation".to_owned(),
            ));
        }
        let topics =
            parse_topics(&topics_text).map_err(|e| CronServiceError::Generation(e.to_string()))?;
        let oneliner_text = self
            .complete(
                ONELINER_SYSTEM_PROMPT,
                &oneliner_input(&topics),
                ONELINER_TEMPERATURE,
            )
            .await?;

        let summary = Summary {
            id: SummaryId(Uuid::now_v7()),
            community_id: community.id,
            chat_title: community.chat_title.clone(),
            message_count: i32::try_from(message_count).unwrap_or(i32::MAX),
            from_message_id: recent.first().map(|m| m.telegram_message_id),
            to_message_id: recent.last().map(|m| m.telegram_message_id),
            topics,
            oneliner: normalize_oneliner(&oneliner_text),
            trigger_type: run.trigger_type.to_owned(),
            trigger_key: run.trigger_key.clone(),
            created_at: run.window_end,
        };

        match self.summaries.insert_if_absent(&summary).await? {
            InsertOutcome::Created => {
                info!(
                    community_id = %community.id,
                    summary_id = %summary.id,
                    trigger_key = %run.trigger_key,
                    message_count,
                    "summary created"
                );
                Ok(GenerateOutcome::Created {
                    summary_id: summary.id,
                    message_count,
                })
            }
            InsertOutcome::FoundExisting => {
                debug!(
                    community_id = %community.id,
                    trigger_key = %run.trigger_key,
                    "summary already written by a concurrent run"
                );
                let existing = self
                    .summaries
                    .find_for_trigger(community.id, &run.trigger_key)
                    .await?
                    .ok_or_else(|| {
                        anyhow!(
                            "summary insert conflicted for community {} but no row was found",
                            community.id
                        )
                    })?;
                Ok(existing_outcome(&existing))
            }
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, CronServiceError> {
        let text = tokio::time::timeout(
            self.call_timeout,
            self.generator.complete(system, user, temperature),
        )
        .await
        .map_err(|_| CronServiceError::Generation("text generation timed out".to_owned()))??;
        Ok(text)
    }
}

impl<M, S, G> SummaryGeneration for GenerateSummaryUseCase<M, S, G>
where
    M: MessageRepository,
    S: SummaryRepository,
    G: TextGenerator,
{
    async fn generate_or_get(
        &self,
        community: &Community,
        run: &SummaryRunContext,
    ) -> Result<GenerateOutcome, CronServiceError> {
        self.execute(community, run).await
    }
}

fn existing_outcome(summary: &Summary) -> GenerateOutcome {
    GenerateOutcome::Existing {
        summary_id: summary.id,
        message_count: summary.message_count.max(0) as u64,
    }
}
