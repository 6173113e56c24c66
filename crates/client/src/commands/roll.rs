//! Run one roll through a full presentation sequence.
//!
//! The command plays the part of the user: timed phases are left to the
//! session's driver, and at the decision point it either accepts the roll or
//! sacrifices the die given by `--sacrifice`.

use anyhow::{Context, Result, bail};
use clap::Parser;
use dice_core::{Purpose, RollRequest};
use roll_runtime::{
    FinalizedRoll, ROLL_FINALIZED, SequencePhase, SequencerConfig, Session, SessionConfig,
    SessionHandle, Submission,
};
use tokio::sync::mpsc;

/// Roll dice notation through a full sequence
#[derive(Parser, Debug)]
pub struct Roll {
    /// Dice notation, e.g. "2d8", "1d20+3" or "3d6, 1d4 -1"
    pub notation: String,

    /// Purpose tag: "free", "skill-<id>" or any other name
    #[arg(long, default_value = "free")]
    pub purpose: String,

    /// Seed for reproducible rolls (overrides DICE_SEED)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Die index to sacrifice at the decision point (skill purposes only)
    #[arg(long)]
    pub sacrifice: Option<usize>,

    /// Skip presentation delays
    #[arg(long)]
    pub instant: bool,

    /// Print the finalized roll as JSON
    #[arg(long)]
    pub json: bool,
}

impl Roll {
    pub async fn execute(self) -> Result<()> {
        let purpose = Purpose::from_tag(&self.purpose);
        let request = RollRequest::from_notation(&self.notation, purpose)
            .with_context(|| format!("Invalid dice notation {:?}", self.notation))?;

        if let Some(index) = self.sacrifice {
            if request.purpose.is_interactive() {
                check_sacrifice(&request, index)?;
            } else {
                tracing::warn!(
                    purpose = %request.purpose,
                    "--sacrifice only applies to skill rolls, ignoring"
                );
            }
        }

        let session = Session::start(self.session_config());
        let handle = session.handle();

        let (tx, mut rx) = mpsc::unbounded_channel();
        handle
            .bus()
            .subscribe(ROLL_FINALIZED, move |roll: &FinalizedRoll| {
                tx.send(roll.clone()).map_err(Into::into)
            });
        let watcher = tokio::spawn(log_phases(handle.clone()));

        match handle.submit_request(&request)? {
            Submission::Started => {}
            Submission::Ignored => bail!("Session is busy with another roll"),
        }

        let phase = handle
            .wait_for_phase(|phase| phase.is_interactive() || phase == SequencePhase::Idle)
            .await;
        if phase.is_interactive() {
            self.decide(&handle)?;
        }
        handle.wait_for_idle().await;

        watcher.abort();
        session.shutdown().await;

        let roll = rx
            .recv()
            .await
            .context("Sequence ended without a finalized roll")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&roll)?);
        } else {
            print_roll(&roll);
        }
        Ok(())
    }

    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::from_env();
        if self.instant {
            config.sequencer = SequencerConfig::instant();
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    fn decide(&self, handle: &SessionHandle) -> Result<()> {
        let Some(index) = self.sacrifice else {
            return Ok(handle.choose_done()?);
        };

        handle.choose_sacrifice()?;
        handle.select_die(index)?;
        handle.confirm_sacrifice()?;
        Ok(())
    }
}

/// Rejects a sacrifice index the request can never produce, before rolling.
fn check_sacrifice(request: &RollRequest, index: usize) -> Result<()> {
    let dice: usize = request.validate()?.iter().map(|(_, quantity)| quantity).sum();
    if index >= dice {
        bail!("Cannot sacrifice die #{index}: the roll has {dice} dice");
    }
    Ok(())
}

async fn log_phases(handle: SessionHandle) {
    let mut phases = handle.phases();
    while phases.changed().await.is_ok() {
        let phase = *phases.borrow_and_update();
        let shown = handle.display();
        tracing::info!(
            %phase,
            dice = ?shown.dice,
            bonus = ?shown.bonus,
            total = ?shown.total,
            "Sequence advanced"
        );
    }
}

fn print_roll(roll: &FinalizedRoll) {
    println!("purpose  {}", roll.purpose);
    println!("formula  {}", roll.formula.as_deref().unwrap_or("-"));
    match roll.sacrificed {
        Some(die) => println!(
            "total    {} (sacrificed die #{} = {})",
            roll.total, die.index, die.value
        ),
        None => println!("total    {}", roll.total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(notation: &str) -> RollRequest {
        RollRequest::from_notation(notation, Purpose::from_tag("skill-lore")).unwrap()
    }

    #[test]
    fn sacrifice_index_within_roll_is_accepted() {
        assert!(check_sacrifice(&skill("2d8+1d6"), 2).is_ok());
    }

    #[test]
    fn sacrifice_index_past_last_die_is_rejected() {
        let err = check_sacrifice(&skill("2d8"), 2).unwrap_err();
        assert!(err.to_string().contains("has 2 dice"));
    }

    #[test]
    fn sacrifice_check_reports_invalid_request() {
        assert!(check_sacrifice(&skill("2d7"), 0).is_err());
    }
}
