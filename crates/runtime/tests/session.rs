use std::sync::{Arc, Mutex};
use std::time::Duration;

use dice_core::{Purpose, RollRequest};
use roll_runtime::{
    FinalizedRoll, ROLL_FINALIZED, SequencePhase, SequencerConfig, Session, SessionConfig,
    SessionHandle, Submission,
};
use tokio::time::Instant;

fn collect(handle: &SessionHandle) -> Arc<Mutex<Vec<FinalizedRoll>>> {
    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    handle.bus().subscribe(ROLL_FINALIZED, move |roll: &FinalizedRoll| {
        sink.lock().unwrap().push(roll.clone());
        Ok(())
    });
    published
}

fn seeded(seed: u64) -> Session {
    Session::start(SessionConfig::new(SequencerConfig::default()).with_seed(seed))
}

#[tokio::test(start_paused = true)]
async fn timers_drive_free_roll_back_to_idle() {
    let session = seeded(7);
    let handle = session.handle();
    let published = collect(&handle);

    let started = Instant::now();
    let submission = handle
        .submit_request(&RollRequest::new(Purpose::Free).with_dice(2, 6))
        .unwrap();
    assert_eq!(submission, Submission::Started);

    handle
        .wait_for_phase(|phase| phase == SequencePhase::BonusReveal)
        .await;
    assert!(started.elapsed() >= Duration::from_millis(1200));
    assert_eq!(handle.display().dice.map(|dice| dice.len()), Some(2));

    handle.wait_for_idle().await;
    assert!(started.elapsed() >= Duration::from_millis(3900));
    assert!(handle.display().is_clear());

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].purpose, "free");
    assert!((2..=12).contains(&published[0].total));

    drop(published);
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn interactive_roll_waits_for_the_user() {
    let session = seeded(11);
    let handle = session.handle();
    let published = collect(&handle);

    handle
        .submit_request(&RollRequest::new(Purpose::from_tag("skill-lore")).with_dice(3, 10))
        .unwrap();
    handle
        .wait_for_phase(|phase| phase == SequencePhase::AwaitingDecision)
        .await;

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.phase(), SequencePhase::AwaitingDecision);
    assert!(published.lock().unwrap().is_empty());

    let record = handle.record().unwrap();
    let sacrificed = record.die(2).unwrap();

    handle.choose_sacrifice().unwrap();
    handle.select_die(2).unwrap();
    handle.confirm_sacrifice().unwrap();
    assert_eq!(handle.phase(), SequencePhase::Closing);

    handle.wait_for_idle().await;

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 1);
    let roll = &published[0];
    assert_eq!(roll.total, record.total() as i64 - i64::from(sacrificed));
    assert_eq!(roll.formula.as_deref(), Some(record.formula()));
    assert_eq!(roll.sacrificed.map(|die| (die.index, die.value)), Some((2, sacrificed)));
}

#[tokio::test(start_paused = true)]
async fn early_animation_complete_disarms_rolling_timer() {
    let session = seeded(3);
    let handle = session.handle();
    let published = collect(&handle);

    let started = Instant::now();
    handle
        .submit_request(&RollRequest::new(Purpose::from_tag("card-5")).with_dice(1, 12))
        .unwrap();
    handle.animation_complete().unwrap();
    assert_eq!(handle.phase(), SequencePhase::BonusReveal);

    handle.wait_for_idle().await;

    // Bonus, total and closing delays only; the rolling delay never fires.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(2700));
    assert!(elapsed < Duration::from_millis(3900));
    assert_eq!(published.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn requests_during_flight_are_ignored() {
    let session = seeded(5);
    let handle = session.handle();
    let published = collect(&handle);
    let request = RollRequest::new(Purpose::Free).with_dice(1, 20);

    assert_eq!(handle.submit_request(&request), Ok(Submission::Started));
    assert_eq!(handle.submit_request(&request), Ok(Submission::Ignored));

    handle.wait_for_idle().await;
    assert_eq!(published.lock().unwrap().len(), 1);

    assert_eq!(handle.submit_request(&request), Ok(Submission::Started));
    handle.wait_for_idle().await;
    assert_eq!(published.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn same_seed_rolls_the_same_dice() {
    let request = RollRequest::new(Purpose::Free).with_dice(4, 20).with_dice(2, 6);

    let first = seeded(1234);
    let second = seeded(1234);
    first.handle().submit_request(&request).unwrap();
    second.handle().submit_request(&request).unwrap();

    assert_eq!(first.handle().record(), second.handle().record());
}

#[tokio::test(start_paused = true)]
async fn phase_watch_reports_each_transition() {
    let session = Session::start(SessionConfig::new(SequencerConfig::default()).with_seed(9));
    let handle = session.handle();
    let mut phases = handle.phases();

    handle
        .submit_request(&RollRequest::new(Purpose::Free).with_dice(1, 4))
        .unwrap();

    let mut seen = Vec::new();
    while phases.changed().await.is_ok() {
        let phase = *phases.borrow_and_update();
        seen.push(phase);
        if phase == SequencePhase::Idle {
            break;
        }
    }

    assert_eq!(
        seen,
        vec![
            SequencePhase::Rolling,
            SequencePhase::BonusReveal,
            SequencePhase::TotalReveal,
            SequencePhase::Closing,
            SequencePhase::Idle,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn handlers_may_call_back_into_the_session() {
    let session = seeded(21);
    let handle = session.handle();
    let observed = Arc::new(Mutex::new(Vec::new()));

    let inner = handle.clone();
    let sink = Arc::clone(&observed);
    let id = handle.bus().subscribe(ROLL_FINALIZED, move |_: &FinalizedRoll| {
        let phase = inner.phase();
        let follow_up = inner.submit_request(&RollRequest::new(Purpose::Free).with_dice(1, 4))?;
        sink.lock().unwrap().push((phase, follow_up));
        Ok(())
    });

    handle
        .submit_request(&RollRequest::new(Purpose::from_tag("skill-lore")).with_dice(2, 8))
        .unwrap();
    handle
        .wait_for_phase(|phase| phase == SequencePhase::AwaitingDecision)
        .await;

    handle.choose_done().unwrap();
    assert_eq!(
        *observed.lock().unwrap(),
        vec![(SequencePhase::Closing, Submission::Ignored)]
    );

    handle.wait_for_idle().await;
    assert_eq!(handle.display(), Default::default());

    // Timer-driven finalization publishes outside the lock too.
    handle
        .submit_request(&RollRequest::new(Purpose::from_tag("card-2")).with_dice(1, 6))
        .unwrap();
    handle.wait_for_idle().await;
    assert_eq!(observed.lock().unwrap().len(), 2);
    assert_eq!(observed.lock().unwrap()[1].1, Submission::Ignored);

    assert!(handle.bus().unsubscribe(ROLL_FINALIZED, id));
    session.shutdown().await;
}
