//! Integration tests for the durable priority job queue: claim races,
//! dependency gating, retry backoff, and the dead-letter sink.

use national_treasure::Store;
use serde_json::json;

#[tokio::test]
async fn claim_is_exclusive_across_concurrent_workers() {
    let store = Store::open_in_memory().await.unwrap();
    let job_id = store
        .enqueue("capture", "capture", json!({"url": "https://example.com"}), 0, 3, None)
        .await
        .unwrap();

    let first = store.claim("capture", "worker-a", 300).await.unwrap();
    assert_eq!(first.unwrap().id, job_id);

    let second = store.claim("capture", "worker-b", 300).await.unwrap();
    assert!(second.is_none(), "a claimed job must not be claimable again");
}

#[tokio::test]
async fn dependent_job_is_not_claimable_until_its_dependency_is_done() {
    let store = Store::open_in_memory().await.unwrap();
    let parent = store
        .enqueue("capture", "capture", json!({"url": "https://a.example"}), 0, 3, None)
        .await
        .unwrap();
    let child = store
        .enqueue(
            "capture",
            "capture",
            json!({"url": "https://a.example/child"}),
            0,
            3,
            Some(&parent),
        )
        .await
        .unwrap();

    let claimed = store.claim("capture", "worker-a", 300).await.unwrap().unwrap();
    assert_eq!(claimed.id, parent, "parent has no dependency, so it is claimable first");

    let blocked = store.claim("capture", "worker-b", 300).await.unwrap();
    assert!(blocked.is_none(), "child must wait for its dependency to complete");

    store.succeed(&parent, "worker-a", json!({"ok": true})).await.unwrap();

    let unblocked = store.claim("capture", "worker-b", 300).await.unwrap().unwrap();
    assert_eq!(unblocked.id, child);
}

#[tokio::test]
async fn failed_job_is_rescheduled_then_dead_lettered_once_attempts_are_exhausted() {
    let store = Store::open_in_memory().await.unwrap();
    let job_id = store
        .enqueue("capture", "capture", json!({"url": "https://b.example"}), 0, 2, None)
        .await
        .unwrap();

    store.claim("capture", "worker-a", 300).await.unwrap().unwrap();
    store.fail(&job_id, "worker-a", "navigation timed out", 0, 3600).await.unwrap();

    // First failure had attempts remaining: rescheduled, immediately claimable
    // again at a zero-second backoff.
    let reclaimed = store.claim("capture", "worker-b", 300).await.unwrap().unwrap();
    assert_eq!(reclaimed.id, job_id);

    // Second failure exhausts max_attempts (2): the job moves to the dead
    // letter sink instead of being rescheduled.
    store.fail(&job_id, "worker-b", "navigation timed out again", 0, 3600).await.unwrap();

    let unclaimable = store.claim("capture", "worker-c", 300).await.unwrap();
    assert!(unclaimable.is_none(), "a dead-lettered job is never claimable again");

    let dead = store.list_dead_letter("capture").await.unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].job_id, job_id);
    assert_eq!(dead[0].attempts, 2);
}

#[tokio::test]
async fn dead_lettered_job_can_be_retried() {
    let store = Store::open_in_memory().await.unwrap();
    let job_id = store
        .enqueue("capture", "capture", json!({"url": "https://c.example"}), 0, 1, None)
        .await
        .unwrap();

    store.claim("capture", "worker-a", 300).await.unwrap();
    store.fail(&job_id, "worker-a", "blocked", 0, 3600).await.unwrap();

    let dead = store.list_dead_letter("capture").await.unwrap();
    assert_eq!(dead.len(), 1);

    store.retry_dead_letter(&dead[0].id).await.unwrap();
    assert!(store.list_dead_letter("capture").await.unwrap().is_empty());

    let reclaimed = store.claim("capture", "worker-b", 300).await.unwrap();
    assert_eq!(reclaimed.unwrap().id, job_id);
}

#[tokio::test]
async fn stale_lease_is_recovered_and_reclaimable() {
    let store = Store::open_in_memory().await.unwrap();
    let job_id = store
        .enqueue("capture", "capture", json!({"url": "https://d.example"}), 0, 3, None)
        .await
        .unwrap();

    store.claim("capture", "worker-a", -1).await.unwrap();

    let recovered = store.recover_stale().await.unwrap();
    assert_eq!(recovered, 1);

    let reclaimed = store.claim("capture", "worker-b", 300).await.unwrap();
    assert_eq!(reclaimed.unwrap().id, job_id);
}

#[tokio::test]
async fn fail_after_reschedules_with_the_caller_supplied_delay_not_backoff() {
    let store = Store::open_in_memory().await.unwrap();
    let job_id = store
        .enqueue("capture", "capture", json!({"url": "https://f.example"}), 0, 3, None)
        .await
        .unwrap();

    store.claim("capture", "worker-a", 300).await.unwrap();
    // A generic backoff with this base/cap would wait 3600s; `fail_after`
    // ignores that schedule entirely and uses its own delay.
    store.fail_after(&job_id, "worker-a", "rate limited", 3600).await.unwrap();

    let immediate = store.claim("capture", "worker-b", 300).await.unwrap();
    assert!(immediate.is_none(), "job is not claimable before its explicit delay elapses");
}

#[tokio::test]
async fn fail_after_dead_letters_once_attempts_are_exhausted_like_fail_does() {
    let store = Store::open_in_memory().await.unwrap();
    let job_id = store
        .enqueue("capture", "capture", json!({"url": "https://g.example"}), 0, 1, None)
        .await
        .unwrap();

    store.claim("capture", "worker-a", 300).await.unwrap();
    store.fail_after(&job_id, "worker-a", "blocked", 0).await.unwrap();

    let dead = store.list_dead_letter("capture").await.unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].job_id, job_id);
    assert_eq!(dead[0].error, "blocked");
}

#[tokio::test]
async fn stale_lease_recovery_counts_as_an_attempt() {
    let store = Store::open_in_memory().await.unwrap();
    let job_id = store
        .enqueue("capture", "capture", json!({"url": "https://e.example"}), 0, 3, None)
        .await
        .unwrap();

    // attempts: 0 -> 1 on claim.
    store.claim("capture", "worker-a", -1).await.unwrap();
    // attempts: 1 -> 2 on recovery, the same as an explicit `fail` would.
    assert_eq!(store.recover_stale().await.unwrap(), 1);
    // attempts: 2 -> 3 on reclaim, reaching `max_attempts` (3).
    store.claim("capture", "worker-b", 300).await.unwrap();

    // With `max_attempts` already reached, this first-ever explicit failure
    // dead-letters the job immediately instead of rescheduling it — only
    // possible if the stale recovery above already counted as an attempt.
    store.fail(&job_id, "worker-b", "navigation timed out", 0, 3600).await.unwrap();

    let dead = store.list_dead_letter("capture").await.unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].job_id, job_id);
    assert_eq!(dead[0].attempts, 3);
}
