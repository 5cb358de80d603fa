//! Controller progression tests against the scripted mock service.
//!
//! Run with: `cargo test -p adventure-core --test progression`

use std::time::Duration;

use adventure_core::controller::{FALLBACK_CONCLUSION, GENERATING_MESSAGE};
use adventure_core::session::fallback_summary;
use adventure_core::{
    Advance, ChapterLimit, Controller, ControllerConfig, ControllerError, ControllerState,
    MockFailure, MockStoryService, MoralAlignment, RestartMode,
};

fn config(limit: u32) -> ControllerConfig {
    ControllerConfig::new().with_chapter_limit(ChapterLimit::new(limit).unwrap())
}

/// A mock that can play `chapters` chapters, each offering two choices.
fn scripted(chapters: u32) -> MockStoryService {
    let mut mock = MockStoryService::new().with_opening("Chapter 1", &["Left", "Right"], Some("S1"));
    for n in 2..=chapters {
        mock = mock.with_continuation(&format!("Chapter {n}"), &["Left", "Right"]);
    }
    mock
}

// =============================================================================
// CONCLUSION TIMING
// =============================================================================

#[tokio::test]
async fn test_every_limit_concludes_exactly_once_at_the_limit() {
    for limit in ChapterLimit::MIN..=ChapterLimit::MAX {
        let mut ctl = Controller::new(scripted(limit), ControllerConfig::new());
        ctl.configure(limit).unwrap();
        assert_eq!(ctl.start_session().await.unwrap(), Advance::Playing);

        for chapter in 2..=limit {
            let advance = ctl.submit_choice(1).await.unwrap();
            assert_eq!(ctl.session().chapter_count(), chapter as usize);
            if chapter < limit {
                assert_eq!(advance, Advance::Playing, "limit {limit}, chapter {chapter}");
                assert!(ctl.conclusion().is_none());
            } else {
                assert_eq!(advance, Advance::Ended, "limit {limit}");
            }
        }

        let calls = ctl.service().calls();
        assert_eq!(calls.conclusions.len(), 1, "limit {limit}");
        assert_eq!(calls.conclusions[0].chapters.len(), limit as usize);
        assert_eq!(calls.conclusions[0].choices.len(), limit as usize - 1);
        assert!(ctl.is_ended());
    }
}

#[tokio::test]
async fn test_split_choice_reaching_the_limit_then_concludes() {
    let mut ctl = Controller::new(scripted(3).with_conclusion("Fin."), config(3));
    let pending = ctl.begin_start().unwrap();
    assert_eq!(ctl.complete_start(pending).await, Advance::Playing);

    let pending = ctl.begin_choice(1).unwrap();
    assert_eq!(ctl.complete_choice(pending).await, Advance::Playing);

    let pending = ctl.begin_choice(2).unwrap();
    assert_eq!(ctl.complete_choice(pending).await, Advance::Concluding);
    assert_eq!(ctl.state(), ControllerState::Concluding);
    assert!(ctl.is_loading());
    assert!(!ctl.choices_enabled());
    assert!(ctl.service().calls().conclusions.is_empty());

    assert_eq!(ctl.conclude().await.unwrap(), Advance::Ended);
    assert_eq!(ctl.conclusion(), Some("Fin."));
    assert!(ctl.is_ended());

    let calls = ctl.service().calls();
    assert_eq!(calls.conclusions.len(), 1);
    assert_eq!(
        calls.conclusions[0].chapters,
        vec![
            MockStoryService::summary_for("Chapter 1", "Left"),
            MockStoryService::summary_for("Chapter 2", "Right"),
            "Chapter 3".to_string(),
        ]
    );
    assert_eq!(
        calls.conclusions[0].choices,
        vec!["Left".to_string(), "Right".to_string()]
    );
}

#[tokio::test]
async fn test_no_choice_accepted_after_the_end() {
    let mut ctl = Controller::new(scripted(3), config(3));
    ctl.start_session().await.unwrap();
    ctl.submit_choice(1).await.unwrap();
    assert_eq!(ctl.submit_choice(2).await.unwrap(), Advance::Ended);

    assert!(matches!(
        ctl.submit_choice(1).await,
        Err(ControllerError::InvalidState { state: ControllerState::Ended, .. })
    ));
    assert_eq!(ctl.service().calls().choices.len(), 2);
}

// =============================================================================
// END-TO-END
// =============================================================================

#[tokio::test]
async fn test_three_chapter_playthrough() {
    let mock = MockStoryService::new()
        .with_opening("A", &["L", "R"], Some("S1"))
        .with_continuation("B", &["X", "Y"])
        .with_continuation("C", &[])
        .with_conclusion("The end.");
    let mut ctl = Controller::new(mock, ControllerConfig::new());
    ctl.configure(3).unwrap();

    assert_eq!(ctl.start_session().await.unwrap(), Advance::Playing);
    assert_eq!(ctl.submit_choice(1).await.unwrap(), Advance::Playing);

    let chapters = ctl.session().chapters();
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].story, "A");
    assert_eq!(chapters[0].chosen.as_deref(), Some("L"));
    assert_eq!(chapters[1].story, "B");
    assert_eq!(chapters[1].chosen, None);

    assert_eq!(ctl.submit_choice(1).await.unwrap(), Advance::Ended);
    assert_eq!(ctl.conclusion(), Some("The end."));
    assert_eq!(ctl.state(), ControllerState::Ended);
    assert!(!ctl.choices_enabled());

    let calls = ctl.service().calls();
    assert_eq!(
        calls.choices,
        vec![("S1".to_string(), 1), ("S1".to_string(), 1)]
    );
    let request = &calls.conclusions[0];
    assert_eq!(
        request.chapters,
        vec![
            MockStoryService::summary_for("A", "L"),
            MockStoryService::summary_for("B", "X"),
            "C".to_string(),
        ]
    );
    assert_eq!(request.choices, vec!["L".to_string(), "X".to_string()]);
    assert_eq!(request.moral_alignment, "neutral");
}

#[tokio::test]
async fn test_conclusion_failure_uses_fallback_ending() {
    let mock = scripted(3).fail_conclusion(MockFailure::Status(503));
    let mut ctl = Controller::new(mock, config(3));
    ctl.start_session().await.unwrap();
    ctl.submit_choice(1).await.unwrap();

    assert_eq!(ctl.submit_choice(1).await.unwrap(), Advance::Ended);
    assert_eq!(ctl.conclusion(), Some(FALLBACK_CONCLUSION));
    assert!(ctl.is_ended());
}

#[tokio::test]
async fn test_reported_alignment_reaches_conclusion() {
    let mock = MockStoryService::new()
        .with_opening("A", &["Spare", "Strike"], Some("S1"))
        .with_aligned_continuation("B", &["Burn", "Leave"], "evil")
        .with_continuation("C", &[]);
    let mut ctl = Controller::new(mock, config(3));
    ctl.start_session().await.unwrap();
    ctl.submit_choice(2).await.unwrap();
    assert_eq!(ctl.alignment(), &MoralAlignment::Evil);

    ctl.submit_choice(1).await.unwrap();
    assert_eq!(ctl.service().calls().conclusions[0].moral_alignment, "evil");
}

// =============================================================================
// SUMMARIES
// =============================================================================

#[tokio::test]
async fn test_failed_summaries_fall_back_per_choice() {
    let mut ctl = Controller::new(scripted(6).fail_summaries(), config(6));
    ctl.start_session().await.unwrap();

    let labels = [2, 1, 1, 2, 1];
    for (i, index) in labels.iter().enumerate() {
        ctl.submit_choice(*index).await.unwrap();
        ctl.apply_pending_summaries();
        let session = ctl.session();
        assert!(session.summary_count() <= session.completed_count(), "after choice {i}");
    }

    let session = ctl.session();
    assert_eq!(session.summary_count(), session.completed_count());
    for chapter in &session.chapters()[..5] {
        let chosen = chapter.chosen.as_deref().unwrap();
        assert_eq!(chapter.summary.as_deref(), Some(fallback_summary(chosen).as_str()));
    }
    assert_eq!(session.chapters()[5].summary, None);
}

#[tokio::test]
async fn test_out_of_order_summaries_land_by_index() {
    let mock = scripted(10).delay_summary("Chapter 1", Duration::from_millis(80));
    let mut ctl = Controller::new(mock, config(10));
    ctl.start_session().await.unwrap();
    ctl.submit_choice(1).await.unwrap();
    ctl.submit_choice(2).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    ctl.apply_pending_summaries();
    let chapters = ctl.session().chapters();
    assert_eq!(chapters[0].summary, None);
    assert_eq!(
        chapters[1].summary.as_deref(),
        Some(MockStoryService::summary_for("Chapter 2", "Right").as_str())
    );

    ctl.flush_summaries().await;
    assert_eq!(
        ctl.session().chapters()[0].summary.as_deref(),
        Some(MockStoryService::summary_for("Chapter 1", "Left").as_str())
    );
    assert_eq!(ctl.pending_summary_count(), 0);
}

#[tokio::test]
async fn test_conclusion_waits_for_slow_summaries() {
    let mock = scripted(3).delay_summary("Chapter 2", Duration::from_millis(50));
    let mut ctl = Controller::new(mock, config(3));
    ctl.start_session().await.unwrap();
    ctl.submit_choice(1).await.unwrap();
    ctl.submit_choice(1).await.unwrap();

    let calls = ctl.service().calls();
    assert_eq!(
        calls.conclusions[0].chapters[1],
        MockStoryService::summary_for("Chapter 2", "Left")
    );
}

// =============================================================================
// RE-ENTRANCY
// =============================================================================

#[tokio::test]
async fn test_second_choice_while_loading_is_ignored() {
    let mut ctl = Controller::new(scripted(5), config(5));
    ctl.start_session().await.unwrap();

    let pending = ctl.begin_choice(1).unwrap();
    assert_eq!(ctl.begin_choice(2), Err(ControllerError::Busy));
    assert_eq!(ctl.begin_start(), Err(ControllerError::Busy));
    assert_eq!(ctl.status_message(), Some(GENERATING_MESSAGE));
    assert_eq!(ctl.session().chapters()[0].chosen.as_deref(), Some("Left"));
    assert!(ctl.service().calls().choices.is_empty());

    assert_eq!(ctl.complete_choice(pending).await, Advance::Playing);
    assert_eq!(ctl.session().chapter_count(), 2);
    assert_eq!(ctl.service().calls().choices.len(), 1);
}

// =============================================================================
// RESTART
// =============================================================================

#[tokio::test]
async fn test_restart_clears_everything() {
    let mock = MockStoryService::new()
        .with_opening("A", &["L", "R"], Some("S1"))
        .with_aligned_continuation("B", &["X"], "mostly_good");
    let mut ctl = Controller::new(mock, config(5));
    ctl.start_session().await.unwrap();
    ctl.submit_choice(2).await.unwrap();
    assert_eq!(ctl.alignment(), &MoralAlignment::MostlyGood);

    assert_eq!(ctl.restart().await.unwrap(), Advance::Configuring);

    let session = ctl.session();
    assert_eq!(session.chapter_count(), 0);
    assert_eq!(session.summary_count(), 0);
    assert!(session.choices_made().is_empty());
    assert_eq!(session.id(), None);
    assert_eq!(ctl.alignment(), &MoralAlignment::Neutral);
    assert!(!ctl.is_ended());
    assert!(ctl.conclusion().is_none());
    assert_eq!(ctl.status_message(), None);
    assert_eq!(ctl.state(), ControllerState::Configuring);
    assert_eq!(ctl.chapter_limit().get(), 5);
}

#[tokio::test]
async fn test_restart_after_ending() {
    let mut ctl = Controller::new(scripted(3), config(3));
    ctl.start_session().await.unwrap();
    ctl.submit_choice(1).await.unwrap();
    ctl.submit_choice(1).await.unwrap();
    assert!(ctl.is_ended());

    ctl.restart().await.unwrap();
    assert!(!ctl.is_ended());
    assert_eq!(ctl.session().chapter_count(), 0);
    assert!(ctl.configure(4).is_ok());
}

#[tokio::test]
async fn test_immediate_restart_fetches_new_opening() {
    let mock = MockStoryService::new()
        .with_opening("A", &["L"], Some("S1"))
        .with_opening("Fresh start", &["Go"], Some("S2"));
    let config = config(4).with_restart_mode(RestartMode::Immediate);
    let mut ctl = Controller::new(mock, config);
    ctl.start_session().await.unwrap();

    assert_eq!(ctl.restart().await.unwrap(), Advance::Playing);
    assert_eq!(ctl.current_story(), Some("Fresh start"));
    assert_eq!(ctl.session().id(), Some("S2"));
    assert_eq!(ctl.progress().label(), "Chapter 1 of 4");
}

#[tokio::test]
async fn test_restart_releases_session_when_configured() {
    let mock = MockStoryService::new().with_opening("A", &["L"], Some("S1"));
    let mut ctl = Controller::new(mock, config(4).with_release_on_restart(true));
    ctl.start_session().await.unwrap();
    ctl.restart().await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(ctl.service().calls().ends, vec!["S1".to_string()]);
}

#[tokio::test]
async fn test_restart_does_not_release_by_default() {
    let mock = MockStoryService::new().with_opening("A", &["L"], Some("S1"));
    let mut ctl = Controller::new(mock, config(4));
    ctl.start_session().await.unwrap();
    ctl.restart().await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(ctl.service().calls().ends.is_empty());
}

#[tokio::test]
async fn test_late_summary_from_old_session_is_ignored() {
    let mock = MockStoryService::new()
        .with_opening("Old", &["L"], Some("S1"))
        .with_continuation("Old 2", &["L"])
        .with_opening("New", &["L"], Some("S2"))
        .with_continuation("New 2", &["L"])
        .delay_summary("Old", Duration::from_millis(60));
    let mut ctl = Controller::new(mock, config(5));

    ctl.start_session().await.unwrap();
    ctl.submit_choice(1).await.unwrap();
    ctl.restart().await.unwrap();
    ctl.start_session().await.unwrap();
    ctl.submit_choice(1).await.unwrap();
    ctl.flush_summaries().await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    ctl.apply_pending_summaries();

    assert_eq!(
        ctl.session().chapters()[0].summary.as_deref(),
        Some(MockStoryService::summary_for("New", "L").as_str())
    );
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn test_start_http_500_leaves_setup_available() {
    let mock = MockStoryService::new()
        .fail_start(MockFailure::Status(500))
        .with_opening("A", &["L"], Some("S1"));
    let mut ctl = Controller::new(mock, config(5));

    assert_eq!(ctl.start_session().await.unwrap(), Advance::Failed);
    assert_eq!(
        ctl.status_message(),
        Some("Failed to fetch the initial story: HTTP error! Status: 500")
    );
    assert_eq!(ctl.session().id(), None);
    assert_eq!(ctl.session().chapter_count(), 0);
    assert_eq!(ctl.state(), ControllerState::Configuring);

    assert!(ctl.configure(7).is_ok());
    assert_eq!(ctl.start_session().await.unwrap(), Advance::Playing);
}

#[tokio::test]
async fn test_choice_failure_can_be_retried() {
    let mock = MockStoryService::new()
        .with_opening("A", &["L", "R"], Some("S1"))
        .fail_choice(MockFailure::Network)
        .with_continuation("B", &["X"]);
    let mut ctl = Controller::new(mock, config(5));
    ctl.start_session().await.unwrap();

    assert_eq!(ctl.submit_choice(1).await.unwrap(), Advance::Failed);
    assert_eq!(
        ctl.status_message(),
        Some("Error processing your choice: connection refused")
    );
    assert!(ctl.choices_enabled());
    assert!(ctl.service().calls().summaries.is_empty());

    assert_eq!(ctl.submit_choice(2).await.unwrap(), Advance::Playing);
    assert_eq!(ctl.session().choices_made(), vec!["R".to_string()]);
    assert_eq!(ctl.status_message(), None);
}

#[tokio::test]
async fn test_missing_story_in_continuation() {
    let mock = MockStoryService::new()
        .with_opening("A", &["L"], Some("S1"))
        .fail_choice(MockFailure::MissingStory);
    let mut ctl = Controller::new(mock, config(5));
    ctl.start_session().await.unwrap();

    assert_eq!(ctl.submit_choice(1).await.unwrap(), Advance::Failed);
    assert_eq!(
        ctl.status_message(),
        Some("Failed to generate the next part of the story.")
    );
    assert_eq!(ctl.session().chapter_count(), 1);
}
