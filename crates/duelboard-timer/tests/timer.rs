//! Integration tests for the one-shot timer.
//!
//! Uses a paused Tokio clock: sleeps resolve as soon as the runtime is
//! otherwise idle, so the tests are instant and deterministic.

use std::time::Duration;

use duelboard_timer::Timer;
use tokio::sync::mpsc;

#[tokio::test(start_paused = true)]
async fn test_armed_timer_fires_after_delay() {
    let mut t = Timer::new("reset");
    let start = tokio::time::Instant::now();
    t.arm(Duration::from_secs(2));

    let fired = t.wait().await;

    assert_eq!(fired.generation, 1);
    assert_eq!(fired.late_by, Duration::ZERO);
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert!(!t.is_armed(), "a fired timer disarms itself");
}

#[tokio::test(start_paused = true)]
async fn test_disarmed_timer_pends_forever() {
    let mut t = Timer::new("reset");
    let result = tokio::time::timeout(Duration::from_secs(60), t.wait()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_firing() {
    let mut t = Timer::new("reset");
    t.arm(Duration::from_secs(2));
    assert!(t.cancel());

    let result = tokio::time::timeout(Duration::from_secs(10), t.wait()).await;
    assert!(result.is_err(), "cancelled timer must not fire");
}

#[tokio::test(start_paused = true)]
async fn test_rearm_replaces_deadline() {
    let mut t = Timer::new("reset");
    t.arm(Duration::from_secs(10));
    let generation = t.arm(Duration::from_secs(1));
    assert_eq!(generation, 2);

    let fired = tokio::time::timeout(Duration::from_secs(2), t.wait())
        .await
        .expect("the shorter deadline wins");
    assert_eq!(fired.generation, 2);
}

#[tokio::test(start_paused = true)]
async fn test_wait_survives_losing_a_select() {
    // Mirrors the room actor loop: commands keep arriving while the
    // timer is armed, and the timer still fires on schedule.
    let mut t = Timer::new("reset");
    let (tx, mut rx) = mpsc::channel::<u32>(8);
    t.arm(Duration::from_secs(2));

    tokio::spawn(async move {
        for i in 0..3 {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let _ = tx.send(i).await;
        }
    });

    let mut handled = Vec::new();
    let start = tokio::time::Instant::now();
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => handled.push(cmd),
            _ = t.wait() => break,
        }
    }

    assert_eq!(handled, vec![0, 1, 2]);
    assert!(start.elapsed() >= Duration::from_secs(2));
}
