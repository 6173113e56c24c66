//! Decode stored roll text.

use anyhow::{Context, Result};
use clap::Parser;
use dice_core::{RollRecord, deserialize};

/// Decode stored roll text and show the recomputed record
#[derive(Parser, Debug)]
pub struct Replay {
    /// Roll text such as "20:17;6:3,5"
    pub formula: String,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let record = deserialize(&self.formula)
            .with_context(|| format!("Failed to decode roll text {:?}", self.formula))?;

        tracing::debug!(formula = record.formula(), "Roll text decoded");

        if self.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            print_record(&record);
        }
        Ok(())
    }
}

fn print_record(record: &RollRecord) {
    for outcome in record.outcomes().iter().filter(|outcome| !outcome.is_empty()) {
        let rolls: Vec<String> = outcome.rolls.iter().map(u32::to_string).collect();
        println!(
            "{:>4}  [{}]  sum {}  best {}  worst {}  mean {:.1}",
            outcome.face,
            rolls.join(", "),
            outcome.sum,
            outcome.best,
            outcome.worst,
            outcome.mean,
        );
    }

    let aggregate = record.aggregate();
    match (aggregate.best, aggregate.worst) {
        (Some(best), Some(worst)) => {
            println!("total {}  best {}  worst {}", aggregate.total, best, worst)
        }
        _ => println!("total {}", aggregate.total),
    }
    println!("formula {}", record.formula());
}
