use std::time::Duration;

use caravan_sim::{
    clock::{ClockState, SimulationClock, Speed},
    engine::Engine,
    Scenario,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

fn engine() -> Engine {
    Engine::from_scenario(&Scenario::default()).expect("engine builds")
}

fn start(
    speed: Speed,
) -> (
    caravan_sim::clock::ClockHandle,
    mpsc::UnboundedReceiver<(u64, Instant)>,
    tokio::task::JoinHandle<anyhow::Result<Engine>>,
) {
    let (clock, handle) =
        SimulationClock::new(engine(), ClockState::new(Duration::from_secs(1), speed));
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(clock.run(move |report, _| {
        let _ = tx.send((report.step, Instant::now()));
    }));
    (handle, rx, task)
}

fn assert_near(actual: Duration, expected: Duration) {
    let slack = Duration::from_millis(5);
    assert!(
        actual + slack >= expected && actual <= expected + slack,
        "expected about {expected:?}, got {actual:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_interval() {
    let origin = Instant::now();
    let (handle, mut rx, task) = start(Speed::X1);

    for expected in 1..=3u64 {
        let (step, at) = rx.recv().await.expect("tick");
        assert_eq!(step, expected);
        assert_near(at - origin, Duration::from_secs(expected));
    }

    handle.shutdown().await.expect("shutdown");
    let engine = task.await.expect("join").expect("clock result");
    assert_eq!(engine.step(), 3);
}

#[tokio::test(start_paused = true)]
async fn speed_shortens_interval() {
    let (handle, mut rx, task) = start(Speed::X1);
    let (_, first) = rx.recv().await.expect("tick");

    handle.set_speed(Speed::X4).await.expect("set speed");
    let (step, second) = rx.recv().await.expect("tick");
    assert_eq!(step, 2);
    assert_near(second - first, Duration::from_millis(250));

    handle.shutdown().await.expect("shutdown");
    task.await.expect("join").expect("clock result");
}

#[tokio::test(start_paused = true)]
async fn pause_holds_step_count() {
    let (handle, mut rx, task) = start(Speed::X2);
    let (step, _) = rx.recv().await.expect("tick");
    assert_eq!(step, 1);

    handle.toggle_pause().await.expect("pause");
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rx.try_recv().is_err());

    // Changing speed while paused leaves the clock paused.
    handle.set_speed(Speed::X8).await.expect("set speed");
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rx.try_recv().is_err());

    handle.toggle_pause().await.expect("resume");
    let resumed = Instant::now();
    let (step, at) = rx.recv().await.expect("tick");
    assert_eq!(step, 2);
    assert_near(at - resumed, Duration::from_millis(125));

    handle.shutdown().await.expect("shutdown");
    let engine = task.await.expect("join").expect("clock result");
    assert_eq!(engine.step(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_stops_clock() {
    let (handle, mut rx, task) = start(Speed::X8);
    rx.recv().await.expect("tick");
    drop(handle);
    let engine = task.await.expect("join").expect("clock result");
    assert!(engine.step() >= 1);
}
