use posecam_scheduler::{CancellationToken, TokenState};
use std::time::Duration;

#[test]
fn test_lifecycle_transitions() {
    let token = CancellationToken::new();
    assert_eq!(token.state(), TokenState::Unstarted);

    assert_eq!(token.advance(), Some(1));
    assert_eq!(token.state(), TokenState::Running(1));
    assert_eq!(token.advance(), Some(2));
    assert_eq!(token.state(), TokenState::Running(2));

    assert!(token.cancel());
    assert_eq!(token.state(), TokenState::Cancelled);
    assert_eq!(token.advance(), None);
    assert_eq!(token.state(), TokenState::Cancelled);
}

#[test]
fn test_cancel_is_idempotent() {
    let once = CancellationToken::new();
    once.advance();
    once.cancel();

    let twice = CancellationToken::new();
    twice.advance();
    assert!(twice.cancel());
    assert!(!twice.cancel());

    assert_eq!(once.state(), twice.state());
    assert!(twice.is_cancelled());
}

#[test]
fn test_cancel_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    assert_eq!(token.advance(), None);
    assert_eq!(token.state(), TokenState::Cancelled);
}

#[test]
fn test_clones_share_state() {
    let token = CancellationToken::new();
    let teardown = token.clone();
    token.advance();
    teardown.cancel();
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_cancelled_resolves_after_cancel() {
    let token = CancellationToken::new();
    let waiter = token.clone();
    let handle = tokio::spawn(async move { waiter.cancelled().await });

    tokio::task::yield_now().await;
    assert!(!handle.is_finished());

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("cancelled() did not resolve")
        .unwrap();
}

#[tokio::test]
async fn test_cancelled_resolves_immediately_when_already_cancelled() {
    let token = CancellationToken::new();
    token.cancel();
    tokio::time::timeout(Duration::from_millis(100), token.cancelled())
        .await
        .expect("cancelled() should not wait");
}

#[test]
fn test_concurrent_advance_and_cancel() {
    let token = CancellationToken::new();
    let runner = token.clone();
    let handle = std::thread::spawn(move || {
        let mut last = 0;
        while let Some(id) = runner.advance() {
            assert!(id > last);
            last = id;
        }
        last
    });

    std::thread::sleep(Duration::from_millis(5));
    token.cancel();
    let last = handle.join().unwrap();
    assert!(last >= 1);
    assert_eq!(token.advance(), None);
}

#[test]
fn test_same_as_tracks_clones() {
    let token = CancellationToken::new();
    assert!(token.same_as(&token.clone()));
    assert!(!token.same_as(&CancellationToken::new()));
}
