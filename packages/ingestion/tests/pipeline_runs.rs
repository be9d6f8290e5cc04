//! End-to-end runs over mocks and the memory store.

use std::sync::Arc;

use ingestion::testing::{
    sample_posts, FailingEntityStore, MockFetcherCall, TestScenario, UnavailableTtlStore,
};
use ingestion::{EntityStore, MemoryStore, RunMode, ScanStatus, ScrapedItem};

const CHEF_DANA_ENTITIES: &str = r#"{"brands":["Tnuva"],"coupons":["DANA10"],"products":[]}"#;

fn chef_dana() -> TestScenario {
    TestScenario::new("chef_dana")
        .with_posts(sample_posts(
            "Dana Cohen",
            &[
                "Morning shakshuka with @tnuva cottage",
                "Use code DANA10 for 10% off",
                "Sunday bread baking",
            ],
        ))
        .with_entity_response(CHEF_DANA_ENTITIES)
}

#[tokio::test]
async fn chef_dana_full_run() {
    let harness = chef_dana().build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Full).await;

    assert!(outcome.success, "run failed: {:?}", outcome.error);
    let stats = outcome.stats.unwrap();
    assert_eq!(stats.posts, 3);
    assert_eq!(stats.reels, 0);
    assert_eq!(stats.content, 3);
    assert_eq!(stats.partnerships, 1);
    assert_eq!(stats.coupons, 1);
    assert_eq!(stats.products, 0);
    assert_eq!(stats.profile.name.as_deref(), Some("Dana Cohen"));

    let creator_id = harness.creator.id;
    let partnerships = harness.store.partnerships_for(creator_id);
    assert_eq!(partnerships.len(), 1);
    assert_eq!(partnerships[0].brand_name, "Tnuva");
    assert_eq!(partnerships[0].discovered_via.as_deref(), Some("ai_analysis"));
    let coupons = harness.store.coupons_for(creator_id);
    assert_eq!(coupons.len(), 1);
    assert_eq!(coupons[0].code, "DANA10");

    let record = harness.ingestion.progress("chef_dana").await.unwrap();
    assert_eq!(record.status, ScanStatus::Completed);
    assert_eq!(record.progress, 100);
    assert_eq!(record.estimated_seconds_remaining, 0);
    let details = record.details.unwrap();
    assert_eq!(details.posts_scraped, Some(3));
    assert_eq!(details.brands_found, Some(1));
    assert_eq!(details.coupons_found, Some(1));
    assert_eq!(details.products_found, Some(0));
}

#[tokio::test]
async fn completed_record_has_camel_case_shape() {
    let harness = chef_dana().build();
    harness.ingestion.run("chef_dana", RunMode::Full).await;

    let record = harness.ingestion.progress("chef_dana").await.unwrap();
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["username"], "chef_dana");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["details"]["postsScraped"], 3);
    assert_eq!(value["estimatedTimeRemaining"], 0);
    assert!(value["startedAt"].is_string());
}

#[tokio::test]
async fn both_fetches_failing_fails_the_run() {
    let harness = chef_dana().failing_posts().failing_reels().build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Full).await;

    assert!(!outcome.success);
    assert!(outcome.stats.is_none());
    let error = outcome.error.unwrap();
    assert!(error.starts_with("fetch failed"), "unexpected error: {error}");

    let record = harness.ingestion.progress("chef_dana").await.unwrap();
    assert_eq!(record.status, ScanStatus::Failed);
    assert_eq!(record.error.as_deref(), Some(error.as_str()));
    assert_eq!(record.progress, 10);
    assert_eq!(harness.completion.call_count(), 0);
}

#[tokio::test]
async fn reel_failure_continues_with_posts() {
    let harness = chef_dana()
        .with_reels(vec![ScrapedItem::reel("never seen")])
        .failing_reels()
        .build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    assert!(outcome.success);
    let stats = outcome.stats.unwrap();
    assert_eq!(stats.posts, 3);
    assert_eq!(stats.reels, 0);
    assert_eq!(stats.partnerships, 1);

    let record = harness.ingestion.progress("chef_dana").await.unwrap();
    assert_eq!(record.status, ScanStatus::Completed);
    assert_eq!(record.details.unwrap().reels_scraped, Some(0));
}

#[tokio::test]
async fn reel_captions_feed_extraction_after_posts() {
    let harness = chef_dana()
        .with_reels(vec![ScrapedItem::reel("Reel with code REEL5")])
        .build();

    harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    let prompts = harness.completion.calls();
    let prompt = &prompts[0];
    let post_at = prompt.find("Sunday bread baking").unwrap();
    let reel_at = prompt.find("Reel with code REEL5").unwrap();
    assert!(post_at < reel_at);
    assert!(prompt.contains("\n---\n"));
}

#[tokio::test]
async fn unparseable_extraction_still_succeeds() {
    let harness = TestScenario::new("chef_dana")
        .with_posts(sample_posts("Dana Cohen", &["Use code DANA10"]))
        .with_entity_response("I found Tnuva and DANA10 in these captions!")
        .build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    assert!(outcome.success);
    let stats = outcome.stats.unwrap();
    assert_eq!(stats.partnerships, 0);
    assert_eq!(stats.coupons, 0);
    assert_eq!(stats.products, 0);
    assert!(harness.store.coupons_for(harness.creator.id).is_empty());

    let details = harness
        .ingestion
        .progress("chef_dana")
        .await
        .unwrap()
        .details
        .unwrap();
    assert_eq!(details.brands_found, Some(0));
}

#[tokio::test]
async fn completion_outage_still_succeeds() {
    let harness = chef_dana().failing_completions().build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Full).await;

    assert!(outcome.success);
    let stats = outcome.stats.unwrap();
    assert_eq!(stats.partnerships, 0);
    assert!(!stats.persona_generated);
    assert!(!stats.greeting_generated);
}

#[tokio::test]
async fn repeated_runs_do_not_duplicate_rows() {
    let harness = TestScenario::new("chef_dana")
        .with_posts(sample_posts("Dana Cohen", &["Tnuva, Osem, DANA10, Bamba"]))
        .with_entity_response(
            r#"{"brands":["Tnuva","Osem"],"coupons":["DANA10"],"products":["Bamba"]}"#,
        )
        .build();

    for _ in 0..2 {
        let outcome = harness.ingestion.run("chef_dana", RunMode::Rescan).await;
        assert!(outcome.success);
    }

    let creator_id = harness.creator.id;
    assert_eq!(harness.store.partnerships_for(creator_id).len(), 2);
    assert_eq!(harness.store.coupons_for(creator_id).len(), 1);
    assert_eq!(harness.store.products_for(creator_id).len(), 1);
}

#[tokio::test]
async fn repeated_names_in_one_response_yield_one_row() {
    let harness = TestScenario::new("chef_dana")
        .with_posts(sample_posts("Dana Cohen", &["lots of Tnuva"]))
        .with_entity_response(
            r#"{"brands":["Tnuva","Tnuva"," Tnuva "],"coupons":["dana10","DANA10"],"products":["Cottage","Cottage"]}"#,
        )
        .build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    let stats = outcome.stats.unwrap();
    assert_eq!(stats.partnerships, 1);
    assert_eq!(stats.coupons, 1);
    assert_eq!(stats.products, 1);

    let creator_id = harness.creator.id;
    assert_eq!(harness.store.partnerships_for(creator_id).len(), 1);
    assert_eq!(harness.store.coupons_for(creator_id).len(), 1);
    let products = harness.store.products_for(creator_id);
    assert_eq!(products.len(), 1);
    assert!(!products[0].is_manual);
    assert_eq!(products[0].category, "כללי");
}

#[tokio::test]
async fn existing_partnership_is_not_overwritten() {
    let harness = chef_dana().build();
    let creator_id = harness.creator.id;
    let mut existing = ingestion::Partnership::discovered(creator_id, "Tnuva");
    existing.status = "paused".to_string();
    existing.discovered_via = Some("manual".to_string());
    harness.store.insert_partnership(&existing).await.unwrap();

    harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    let partnerships = harness.store.partnerships_for(creator_id);
    assert_eq!(partnerships.len(), 1);
    assert_eq!(partnerships[0].status, "paused");
    assert_eq!(partnerships[0].discovered_via.as_deref(), Some("manual"));
}

#[tokio::test]
async fn unknown_creator_fails() {
    let harness = chef_dana().build();

    let outcome = harness.ingestion.run("ghost", RunMode::Full).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("creator not found: ghost"));
    let record = harness.ingestion.progress("ghost").await.unwrap();
    assert_eq!(record.status, ScanStatus::Failed);
    assert!(harness.fetcher.calls().is_empty());
}

#[tokio::test]
async fn creator_limits_reach_the_fetcher() {
    let harness = chef_dana().with_limits(2, 1).build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    assert_eq!(outcome.stats.unwrap().posts, 2);
    assert_eq!(
        harness.fetcher.calls(),
        vec![
            MockFetcherCall::Posts {
                handle: "chef_dana".into(),
                limit: 2
            },
            MockFetcherCall::Reels {
                handle: "chef_dana".into(),
                limit: 1
            },
        ]
    );
}

#[tokio::test]
async fn default_limits_apply_without_overrides() {
    let harness = chef_dana().build();
    harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    assert_eq!(
        harness.fetcher.calls()[0],
        MockFetcherCall::Posts {
            handle: "chef_dana".into(),
            limit: 50
        }
    );
    assert_eq!(
        harness.fetcher.calls()[1],
        MockFetcherCall::Reels {
            handle: "chef_dana".into(),
            limit: 30
        }
    );
}

#[tokio::test]
async fn full_run_stores_persona_and_greeting() {
    let harness = chef_dana()
        .with_persona_response(
            r#"{"tone":"warm","style":"chatty","emoji_style":"heavy","response_length":"short","topics":["cooking"]}"#,
        )
        .with_greeting_response(
            r#"{"greeting":"Hi! I'm Dana's kitchen bot","questions":["What's for dinner?","Any coupons?","Best bread recipe?","Where do you shop?"]}"#,
        )
        .build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Full).await;

    let stats = outcome.stats.unwrap();
    assert!(stats.persona_generated);
    assert!(stats.greeting_generated);

    let record = harness.store.persona_for(harness.creator.id).unwrap();
    assert_eq!(record.persona.tone, "warm");
    assert_eq!(record.persona.topics, vec!["cooking".to_string()]);
    let greeting = record.greeting.unwrap();
    assert_eq!(greeting.questions.len(), 4);
}

#[tokio::test]
async fn rescan_skips_persona() {
    let harness = chef_dana()
        .with_persona_response(r#"{"tone":"warm"}"#)
        .build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    let stats = outcome.stats.unwrap();
    assert!(!stats.persona_generated);
    assert!(!stats.greeting_generated);
    assert_eq!(harness.completion.calls_containing("Analyze the writing style"), 0);
    assert_eq!(harness.completion.calls_containing("Write a greeting"), 0);
    assert!(harness.store.persona_for(harness.creator.id).is_none());
}

#[tokio::test]
async fn profile_fields_are_refreshed() {
    let harness = chef_dana().build();

    harness.ingestion.run("chef_dana", RunMode::Rescan).await;

    let creator = harness.store.creator("chef_dana").unwrap();
    assert_eq!(creator.display_name.as_deref(), Some("Dana Cohen"));
    assert_eq!(creator.followers_count, Some(48_000));
    assert_eq!(
        creator.avatar_url.as_deref(),
        Some("https://cdn.example.com/avatar.jpg")
    );
    assert!(creator.last_scanned_at.is_some());
}

#[tokio::test]
async fn stored_avatar_survives_content_without_picture() {
    let harness = TestScenario::new("chef_dana")
        .with_posts(vec![ScrapedItem::post("Sunday bread baking")])
        .build();
    harness.store.add_creator(ingestion::Creator {
        avatar_url: Some("https://media.example.com/dana.jpg".to_string()),
        ..harness.creator.clone()
    });

    let outcome = harness.ingestion.run("chef_dana", RunMode::Rescan).await;
    assert!(outcome.success);

    let creator = harness.store.creator("chef_dana").unwrap();
    assert_eq!(
        creator.avatar_url.as_deref(),
        Some("https://media.example.com/dana.jpg")
    );
    assert!(creator.last_scanned_at.is_some());
}

#[tokio::test]
async fn persistence_failure_fails_the_run() {
    let memory = Arc::new(MemoryStore::new());
    let entities: Arc<dyn EntityStore> = Arc::new(FailingEntityStore::new(memory.clone()));
    let harness = chef_dana().build_with_entity_store(entities, memory);

    let outcome = harness.ingestion.run("chef_dana", RunMode::Full).await;

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().starts_with("storage error"));

    let record = harness.ingestion.progress("chef_dana").await.unwrap();
    assert_eq!(record.status, ScanStatus::Failed);
    assert_eq!(record.progress, 70);
    assert_eq!(record.estimated_seconds_remaining, 0);
}

#[tokio::test]
async fn progress_store_outage_does_not_fail_the_run() {
    let harness = chef_dana()
        .with_ttl_store(Arc::new(UnavailableTtlStore))
        .build();

    let outcome = harness.ingestion.run("chef_dana", RunMode::Full).await;

    assert!(outcome.success);
    assert_eq!(outcome.stats.unwrap().partnerships, 1);
    assert!(harness.ingestion.progress("chef_dana").await.is_none());
}

#[tokio::test]
async fn new_run_resets_a_finished_record() {
    let harness = chef_dana().failing_posts().build();
    harness.ingestion.run("chef_dana", RunMode::Full).await;
    assert_eq!(
        harness.ingestion.progress("chef_dana").await.unwrap().status,
        ScanStatus::Failed
    );

    harness.ingestion.progress_store().init("chef_dana").await;
    let record = harness.ingestion.progress("chef_dana").await.unwrap();
    assert_eq!(record.status, ScanStatus::Starting);
    assert_eq!(record.progress, 0);
    assert!(record.error.is_none());
}
