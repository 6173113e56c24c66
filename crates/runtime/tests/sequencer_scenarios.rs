use std::sync::{Arc, Mutex};

use dice_core::{DiceError, FixedRoller, Purpose, RequestIssue, RollRequest, deserialize};
use roll_runtime::{
    EventBus, FinalizedRoll, ROLL_FINALIZED, RollSequencer, SacrificedDie, SequenceError,
    SequencePhase, SequencerConfig, Submission, Trigger,
};

type Published = Arc<Mutex<Vec<FinalizedRoll>>>;

fn setup(rolls: &[u32]) -> (RollSequencer, Published) {
    let bus = EventBus::new();
    let published: Published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    bus.subscribe(ROLL_FINALIZED, move |roll: &FinalizedRoll| {
        sink.lock().unwrap().push(roll.clone());
        Ok(())
    });

    let sequencer = RollSequencer::new(
        SequencerConfig::default(),
        bus,
        FixedRoller::new(rolls.iter().copied()),
    );
    (sequencer, published)
}

/// Elapses timed phases until the sequencer waits on the user or is idle,
/// returning every phase visited along the way.
fn run_timers(sequencer: &mut RollSequencer) -> Vec<SequencePhase> {
    let mut visited = vec![sequencer.phase()];
    while sequencer.pending_timer().is_some() {
        sequencer.elapse().unwrap();
        visited.push(sequencer.phase());
    }
    visited
}

fn elapse_to(sequencer: &mut RollSequencer, phase: SequencePhase) {
    while sequencer.phase() != phase {
        sequencer.elapse().unwrap();
    }
}

#[test]
fn free_roll_closes_without_decision() {
    let (mut seq, published) = setup(&[14]);
    let request = RollRequest::new(Purpose::from_tag("free")).with_dice(1, 20);

    assert_eq!(seq.submit_request(&request), Ok(Submission::Started));
    let visited = run_timers(&mut seq);

    assert_eq!(
        visited,
        vec![
            SequencePhase::Rolling,
            SequencePhase::BonusReveal,
            SequencePhase::TotalReveal,
            SequencePhase::Closing,
            SequencePhase::Idle,
        ]
    );
    assert!(!visited.contains(&SequencePhase::AwaitingDecision));

    let published = published.lock().unwrap();
    assert_eq!(
        *published,
        vec![FinalizedRoll {
            total: 14,
            formula: Some("20:14".to_owned()),
            purpose: "free".to_owned(),
            sacrificed: None,
        }]
    );
}

#[test]
fn free_roll_never_shows_total_digits() {
    let (mut seq, _) = setup(&[9]);
    seq.submit_request(&RollRequest::new(Purpose::Free).with_dice(1, 20).with_bonus(2))
        .unwrap();

    elapse_to(&mut seq, SequencePhase::Closing);

    let display = seq.display();
    assert_eq!(display.dice.as_deref(), Some(&[9][..]));
    assert_eq!(display.bonus.as_deref(), Some("02"));
    assert_eq!(display.total, None);
    assert_eq!(display.displayed_total, None);
}

#[test]
fn skill_roll_sacrifice_publishes_adjusted_total() {
    let (mut seq, published) = setup(&[5, 6]);
    let request = RollRequest::new(Purpose::from_tag("skill-xyz")).with_dice(2, 8);

    seq.submit_request(&request).unwrap();
    let visited = run_timers(&mut seq);

    assert_eq!(visited.last(), Some(&SequencePhase::AwaitingDecision));
    assert!(visited.contains(&SequencePhase::TotalReveal));
    assert_eq!(seq.display().total.as_deref(), Some("011"));
    assert!(published.lock().unwrap().is_empty());

    seq.choose_sacrifice().unwrap();
    assert_eq!(seq.phase(), SequencePhase::SacrificeSelect);
    assert!(seq.display().sacrifice_enabled);

    seq.select_die(0).unwrap();
    assert_eq!(seq.selection(), Some(0));
    assert_eq!(seq.display().displayed_total, Some(6));
    assert_eq!(seq.display().total.as_deref(), Some("006"));
    assert_eq!(seq.record().map(|record| record.total()), Some(11));

    seq.confirm_sacrifice().unwrap();
    assert_eq!(seq.phase(), SequencePhase::Closing);
    assert_eq!(
        *published.lock().unwrap(),
        vec![FinalizedRoll {
            total: 6,
            formula: Some("8:5,6".to_owned()),
            purpose: "skill-xyz".to_owned(),
            sacrificed: Some(SacrificedDie { index: 0, value: 5 }),
        }]
    );

    seq.elapse().unwrap();
    assert_eq!(seq.phase(), SequencePhase::Idle);
    assert!(seq.display().is_clear());
    assert!(seq.record().is_none());
    assert_eq!(published.lock().unwrap().len(), 1);
}

#[test]
fn reselecting_replaces_the_previous_choice() {
    let (mut seq, _) = setup(&[5, 6]);
    seq.submit_request(&RollRequest::new(Purpose::from_tag("skill-xyz")).with_dice(2, 8))
        .unwrap();
    elapse_to(&mut seq, SequencePhase::AwaitingDecision);
    seq.choose_sacrifice().unwrap();

    seq.select_die(0).unwrap();
    seq.select_die(1).unwrap();

    assert_eq!(seq.selection(), Some(1));
    assert_eq!(seq.display().displayed_total, Some(5));
}

#[test]
fn cancel_restores_total_and_done_publishes_unmodified_roll() {
    let (mut seq, published) = setup(&[5, 6]);
    seq.submit_request(&RollRequest::new(Purpose::from_tag("skill-xyz")).with_dice(2, 8))
        .unwrap();
    elapse_to(&mut seq, SequencePhase::AwaitingDecision);

    seq.choose_sacrifice().unwrap();
    seq.select_die(1).unwrap();
    seq.cancel_sacrifice().unwrap();

    assert_eq!(seq.phase(), SequencePhase::AwaitingDecision);
    assert_eq!(seq.selection(), None);
    assert!(!seq.display().sacrifice_enabled);
    assert_eq!(seq.display().displayed_total, Some(11));
    assert_eq!(seq.display().total.as_deref(), Some("011"));

    seq.choose_done().unwrap();

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].total, 11);
    assert_eq!(published[0].sacrificed, None);
}

#[test]
fn sacrifice_errors_leave_state_untouched() {
    let (mut seq, published) = setup(&[5, 6]);
    seq.submit_request(&RollRequest::new(Purpose::from_tag("skill-xyz")).with_dice(2, 8))
        .unwrap();
    elapse_to(&mut seq, SequencePhase::AwaitingDecision);

    assert_eq!(
        seq.select_die(0),
        Err(SequenceError::UnexpectedTrigger {
            phase: SequencePhase::AwaitingDecision,
            trigger: Trigger::SelectDie
        })
    );

    seq.choose_sacrifice().unwrap();
    assert_eq!(seq.confirm_sacrifice(), Err(SequenceError::NoDieSelected));
    assert_eq!(
        seq.select_die(2),
        Err(SequenceError::DieOutOfRange { index: 2, len: 2 })
    );

    assert_eq!(seq.phase(), SequencePhase::SacrificeSelect);
    assert_eq!(seq.selection(), None);
    assert_eq!(seq.display().displayed_total, Some(11));
    assert!(published.lock().unwrap().is_empty());
}

#[test]
fn named_roll_shows_total_and_auto_closes() {
    let (mut seq, published) = setup(&[3, 4]);
    seq.submit_request(&RollRequest::new(Purpose::from_tag("card-42")).with_dice(2, 6))
        .unwrap();

    elapse_to(&mut seq, SequencePhase::Closing);

    assert_eq!(seq.display().total.as_deref(), Some("007"));
    assert_eq!(published.lock().unwrap()[0].purpose, "card-42");

    seq.elapse().unwrap();
    assert_eq!(seq.phase(), SequencePhase::Idle);
}

#[test]
fn second_submission_is_ignored_while_in_flight() {
    let (mut seq, published) = setup(&[5, 6, 1, 1]);
    let first = RollRequest::new(Purpose::from_tag("skill-xyz")).with_dice(2, 8);
    let second = RollRequest::new(Purpose::Free).with_dice(2, 4);

    seq.submit_request(&first).unwrap();
    let formula = seq.record().unwrap().formula().to_owned();
    let timer = seq.pending_timer();

    assert_eq!(seq.submit_request(&second), Ok(Submission::Ignored));
    assert_eq!(seq.phase(), SequencePhase::Rolling);
    assert_eq!(seq.pending_timer(), timer);
    assert_eq!(seq.record().unwrap().formula(), formula);

    elapse_to(&mut seq, SequencePhase::AwaitingDecision);
    assert_eq!(seq.submit_request(&second), Ok(Submission::Ignored));
    seq.choose_done().unwrap();
    assert_eq!(seq.submit_request(&second), Ok(Submission::Ignored));
    seq.elapse().unwrap();

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].formula.as_deref(), Some("8:5,6"));
}

#[test]
fn invalid_request_is_rejected_from_idle() {
    let (mut seq, published) = setup(&[1]);
    let request = RollRequest::new(Purpose::Free).with_dice(1, 20).with_dice(-2, 6);

    assert_eq!(
        seq.submit_request(&request),
        Err(SequenceError::InvalidRequest(DiceError::InvalidRequest {
            index: 1,
            issue: RequestIssue::NegativeQuantity(-2)
        }))
    );
    assert_eq!(seq.phase(), SequencePhase::Idle);
    assert_eq!(seq.pending_timer(), None);
    assert!(seq.display().is_clear());
    assert!(published.lock().unwrap().is_empty());

    let unknown = RollRequest::new(Purpose::Free).with_dice(1, 100);
    assert!(matches!(
        seq.submit_request(&unknown),
        Err(SequenceError::InvalidRequest(_))
    ));
    assert_eq!(seq.phase(), SequencePhase::Idle);
}

#[test]
fn parse_failure_does_not_disturb_idle_sequencer() {
    let (seq, published) = setup(&[1]);

    assert!(deserialize("20:17;6:9").is_err());

    assert_eq!(seq.phase(), SequencePhase::Idle);
    assert!(published.lock().unwrap().is_empty());
}

#[test]
fn empty_roll_publishes_without_formula() {
    let (mut seq, published) = setup(&[]);
    seq.submit_request(&RollRequest::new(Purpose::from_tag("card-1")).with_dice(0, 6))
        .unwrap();

    run_timers(&mut seq);

    let published = published.lock().unwrap();
    assert_eq!(published[0].total, 0);
    assert_eq!(published[0].formula, None);
}

#[test]
fn failing_consumer_does_not_block_other_consumers() {
    let bus = EventBus::new();
    bus.subscribe(ROLL_FINALIZED, |_: &FinalizedRoll| {
        Err("karma store unavailable".into())
    });
    let received = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&received);
    bus.subscribe(ROLL_FINALIZED, move |_: &FinalizedRoll| {
        *counter.lock().unwrap() += 1;
        Ok(())
    });

    let mut seq = RollSequencer::new(SequencerConfig::instant(), bus, FixedRoller::new([2]));
    seq.submit_request(&RollRequest::new(Purpose::Free).with_dice(1, 4))
        .unwrap();
    run_timers(&mut seq);

    assert_eq!(*received.lock().unwrap(), 1);
    assert_eq!(seq.phase(), SequencePhase::Idle);
}
