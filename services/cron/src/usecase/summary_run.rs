use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};

use gazette_domain::id::SummaryId;

use crate::domain::repository::{
    CommunityRepository, MessageRepository, SummariesReadyNotifier, SummaryDelivery,
    SummaryGeneration, SummaryRepository,
};
use crate::domain::run_context::SummaryRunContext;
use crate::domain::summary::{
    CandidateProbe, DeliveryResult, ErrorScope, GenerateOutcome, ProcessingError,
    SummaryStats, select_candidates,
};
use crate::domain::types::Community;
use crate::error::CronServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRunReport {
    pub stats: SummaryStats,
    pub errors: Vec<ProcessingError>,
}

impl SummaryRunReport {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What happened to one candidate community.
#[derive(Debug)]
enum CommunityOutcome {
    GenerationFailed(ProcessingError),
    NotEnoughMessages,
    Generated {
        created: bool,
        delivery: DeliveryOutcome,
    },
}

#[derive(Debug)]
enum DeliveryOutcome {
    NotificationsDisabled,
    Succeeded,
    Failed(ProcessingError),
}

/// The daily summary job: probe, select, then generate and deliver per community with
/// bounded concurrency. Per-community failures are recorded, never propagated.
/// App users get a best-effort push once the run finishes.
pub struct RunDailySummariesUseCase<C, M, S, G, D, P>
where
    C: CommunityRepository,
    M: MessageRepository,
    S: SummaryRepository,
    G: SummaryGeneration,
    D: SummaryDelivery,
    P: SummariesReadyNotifier,
{
    pub communities: C,
    pub messages: M,
    pub summaries: S,
    pub generator: G,
    pub delivery: D,
    pub push: P,
    pub min_messages: u64,
    pub concurrency: usize,
}

impl<C, M, S, G, D, P> RunDailySummariesUseCase<C, M, S, G, D, P>
where
    C: CommunityRepository,
    M: MessageRepository,
    S: SummaryRepository,
    G: SummaryGeneration,
    D: SummaryDelivery,
    P: SummariesReadyNotifier,
{
    pub async fn execute(
        &self,
        run: &SummaryRunContext,
    ) -> Result<SummaryRunReport, CronServiceError> {
        let active = self.communities.list_active().await?;
        let concurrency = self.concurrency.max(1);

        let mut stats = SummaryStats {
            active_communities: active.len() as u32,
            ..SummaryStats::default()
        };
        let mut errors = Vec::new();

        let probed: Vec<_> = stream::iter(active)
            .map(|community| async move {
                let probe = self.probe(&community, run).await;
                (community, probe)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut probes = Vec::with_capacity(probed.len());
        for (community, probe) in probed {
            match probe {
                Ok(probe) => probes.push(probe),
                Err(e) => {
                    error!(community_id = %community.id, error = %e.detail(), "summary candidate probe failed");
                    errors.push(processing_error(&community, ErrorScope::Generation, None, &e));
                }
            }
        }

        let selection = select_candidates(probes, self.min_messages);
        stats.candidates = selection.candidates.len() as u32;
        stats.skipped_not_enough_messages += selection.skipped_not_enough_messages;
        stats.existing_for_run += selection.existing_for_run;

        let outcomes: Vec<CommunityOutcome> = stream::iter(selection.candidates)
            .map(|community| async move { self.process(community, run).await })
            .buffered(concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            stats.processed += 1;
            match outcome {
                CommunityOutcome::GenerationFailed(e) => errors.push(e),
                CommunityOutcome::NotEnoughMessages => stats.skipped_not_enough_messages += 1,
                CommunityOutcome::Generated { created, delivery } => {
                    if created {
                        stats.generated += 1;
                    } else {
                        stats.existing_for_run += 1;
                    }
                    match delivery {
                        DeliveryOutcome::NotificationsDisabled => {
                            stats.skipped_by_notifications_disabled += 1
                        }
                        DeliveryOutcome::Succeeded => {
                            stats.delivery_attempted += 1;
                            stats.delivery_succeeded += 1;
                        }
                        DeliveryOutcome::Failed(e) => {
                            stats.delivery_attempted += 1;
                            stats.delivery_failed += 1;
                            errors.push(e);
                        }
                    }
                }
            }
        }
        stats.errors = errors.len() as u32;

        info!(
            trigger_key = %run.trigger_key,
            active_communities = stats.active_communities,
            candidates = stats.candidates,
            generated = stats.generated,
            existing_for_run = stats.existing_for_run,
            delivery_succeeded = stats.delivery_succeeded,
            delivery_failed = stats.delivery_failed,
            errors = stats.errors,
            "daily summary run finished"
        );

        // Push failures never reach the report.
        if let Err(e) = self.push.notify_summaries_ready().await {
            warn!(error = %e.detail(), "summaries-ready push failed");
        }

        Ok(SummaryRunReport { stats, errors })
    }

    async fn probe(
        &self,
        community: &Community,
        run: &SummaryRunContext,
    ) -> Result<CandidateProbe, CronServiceError> {
        let message_count = self
            .messages
            .count_in_window(community.id, run.window_start, run.window_end)
            .await?;
        let has_summary = self
            .summaries
            .find_for_trigger(community.id, &run.trigger_key)
            .await?
            .is_some();
        Ok(CandidateProbe {
            community: community.clone(),
            message_count,
            has_summary,
        })
    }

    async fn process(&self, community: Community, run: &SummaryRunContext) -> CommunityOutcome {
        let (summary_id, created) = match self.generator.generate_or_get(&community, run).await {
            Ok(GenerateOutcome::Created { summary_id, .. }) => (summary_id, true),
            Ok(GenerateOutcome::Existing { summary_id, .. }) => (summary_id, false),
            Ok(GenerateOutcome::NotEnoughMessages { .. }) => {
                return CommunityOutcome::NotEnoughMessages;
            }
            Err(e) => {
                error!(
                    community_id = %community.id,
                    chat_id = %community.chat_id,
                    error = %e.detail(),
                    "summary generation failed"
                );
                return CommunityOutcome::GenerationFailed(processing_error(
                    &community,
                    ErrorScope::Generation,
                    None,
                    &e,
                ));
            }
        };

        if !community.summary_notifications_enabled {
            return CommunityOutcome::Generated {
                created,
                delivery: DeliveryOutcome::NotificationsDisabled,
            };
        }

        let delivery = match self.delivery.deliver(summary_id).await {
            Ok(DeliveryResult::Sent(_)) => DeliveryOutcome::Succeeded,
            Ok(DeliveryResult::Rejected(reason)) => {
                warn!(
                    community_id = %community.id,
                    summary_id = %summary_id,
                    reason = reason.as_str(),
                    "summary delivery rejected"
                );
                DeliveryOutcome::Failed(ProcessingError {
                    scope: ErrorScope::Delivery,
                    community_id: community.id,
                    chat_id: community.chat_id,
                    summary_id: Some(summary_id),
                    error: format!("Summary delivery rejected: {}", reason.as_str()),
                })
            }
            Err(e) => {
                error!(
                    community_id = %community.id,
                    summary_id = %summary_id,
                    error = %e.detail(),
                    "summary delivery failed"
                );
                DeliveryOutcome::Failed(processing_error(
                    &community,
                    ErrorScope::Delivery,
                    Some(summary_id),
                    &e,
                ))
            }
        };

        CommunityOutcome::Generated { created, delivery }
    }
}

fn processing_error(
    community: &Community,
    scope: ErrorScope,
    summary_id: Option<SummaryId>,
    e: &CronServiceError,
) -> ProcessingError {
    ProcessingError {
        scope,
        community_id: community.id,
        chat_id: community.chat_id,
        summary_id,
        error: e.detail(),
    }
}
