use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};

use gazette_cron::domain::types::ChatType;
use gazette_cron::error::CronServiceError;
use gazette_cron::usecase::cleanup::ScheduleHelperDeletionUseCase;
use gazette_cron::usecase::helper_message::{SendHelperMessageInput, SendHelperMessageUseCase};
use gazette_cron::usecase::notifications::SetSummaryNotificationsUseCase;
use gazette_domain::id::ChatId;

use crate::helpers::{MockCleanupQueue, MockCommunityRepo, MockTelegram, test_community};

fn usecase(
    telegram: MockTelegram,
    communities: MockCommunityRepo,
    queue: MockCleanupQueue,
) -> SendHelperMessageUseCase<MockTelegram, MockCommunityRepo, MockCleanupQueue> {
    SendHelperMessageUseCase {
        telegram,
        communities,
        schedule: ScheduleHelperDeletionUseCase { queue },
        ttl: Duration::seconds(60),
        call_timeout: StdDuration::from_secs(5),
    }
}

fn input(chat_id: i64, ttl: Option<Duration>) -> SendHelperMessageInput {
    SendHelperMessageInput {
        chat_id: ChatId(chat_id),
        text: "Use /summary to get today's digest".to_owned(),
        ttl,
        now: Utc::now(),
    }
}

// ── SendHelperMessageUseCase ─────────────────────────────────────────────────

#[tokio::test]
async fn should_schedule_deletion_in_tracked_supergroup() {
    let queue = MockCleanupQueue::default();
    let telegram = MockTelegram::new(ChatType::Supergroup);
    let communities = MockCommunityRepo::new(vec![test_community(-1001)]);
    let input = input(-1001, None);
    let now = input.now;

    let output = usecase(telegram.clone(), communities, queue.clone())
        .execute(input)
        .await
        .unwrap();

    assert_eq!(telegram.sent_count(), 1);
    assert_eq!(output.sent.chat_id, ChatId(-1001));
    assert_eq!(output.delete_after, Some(now + Duration::seconds(60)));
    let items = queue.items.lock().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].message_id, output.sent.message_id);
    assert_eq!(items[0].created_at, now);
}

#[tokio::test]
async fn should_use_requested_ttl_over_default() {
    let queue = MockCleanupQueue::default();
    let communities = MockCommunityRepo::new(vec![test_community(-1001)]);
    let input = input(-1001, Some(Duration::seconds(5)));
    let now = input.now;

    let output = usecase(MockTelegram::default(), communities, queue)
        .execute(input)
        .await
        .unwrap();

    assert_eq!(output.delete_after, Some(now + Duration::seconds(5)));
}

#[tokio::test]
async fn should_not_schedule_in_private_chat() {
    let queue = MockCleanupQueue::default();
    let telegram = MockTelegram::new(ChatType::Private);
    let communities = MockCommunityRepo::new(vec![test_community(4242)]);

    let output = usecase(telegram.clone(), communities, queue.clone())
        .execute(input(4242, None))
        .await
        .unwrap();

    assert_eq!(telegram.sent_count(), 1);
    assert_eq!(output.delete_after, None);
    assert_eq!(queue.len(), 0);
}

#[tokio::test]
async fn should_not_schedule_in_untracked_group() {
    let queue = MockCleanupQueue::default();
    let telegram = MockTelegram::new(ChatType::Group);

    let output = usecase(telegram, MockCommunityRepo::default(), queue.clone())
        .execute(input(-2002, None))
        .await
        .unwrap();

    assert_eq!(output.delete_after, None);
    assert_eq!(queue.len(), 0);
}

#[tokio::test]
async fn should_keep_sent_message_when_scheduling_fails() {
    let telegram = MockTelegram::new(ChatType::Supergroup);
    let communities = MockCommunityRepo::new(vec![test_community(-1001)]);

    let output = usecase(telegram.clone(), communities, MockCleanupQueue::failing_enqueue())
        .execute(input(-1001, None))
        .await
        .unwrap();

    assert_eq!(telegram.sent_count(), 1);
    assert_eq!(output.delete_after, None);
}

#[tokio::test]
async fn should_keep_sent_message_when_community_lookup_fails() {
    let queue = MockCleanupQueue::default();
    let communities = MockCommunityRepo {
        fail_lookup: true,
        ..MockCommunityRepo::new(vec![test_community(-1001)])
    };

    let output = usecase(MockTelegram::default(), communities, queue.clone())
        .execute(input(-1001, None))
        .await
        .unwrap();

    assert_eq!(output.delete_after, None);
    assert_eq!(queue.len(), 0);
}

#[tokio::test]
async fn should_reject_empty_text_without_sending() {
    let telegram = MockTelegram::default();
    let mut input = input(-1001, None);
    input.text = "   ".to_owned();

    let result = usecase(
        telegram.clone(),
        MockCommunityRepo::default(),
        MockCleanupQueue::default(),
    )
    .execute(input)
    .await;

    assert!(
        matches!(result, Err(CronServiceError::InvalidRequest(_))),
        "expected InvalidRequest, got {result:?}"
    );
    assert_eq!(telegram.sent_count(), 0);
}

// ── SetSummaryNotificationsUseCase ───────────────────────────────────────────

#[tokio::test]
async fn should_toggle_summary_notifications() {
    let communities = MockCommunityRepo::new(vec![test_community(-1001)]);
    let usecase = SetSummaryNotificationsUseCase {
        communities: communities.clone(),
    };

    usecase.execute(ChatId(-1001), false).await.unwrap();

    let stored = communities.communities.lock().unwrap()[0].clone();
    assert!(!stored.summary_notifications_enabled);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_chat() {
    let usecase = SetSummaryNotificationsUseCase {
        communities: MockCommunityRepo::default(),
    };

    let result = usecase.execute(ChatId(-9), true).await;

    assert!(
        matches!(result, Err(CronServiceError::CommunityNotFound)),
        "expected CommunityNotFound, got {result:?}"
    );
}
