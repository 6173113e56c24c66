//! Sequencer and session configuration loaders.
use std::env;
use std::time::Duration;

/// Presentation delays between sequencer phases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Dice tumbling before faces are shown (`Rolling`).
    pub animation_delay: Duration,
    /// Faces shown before the bonus digits (`BonusReveal`).
    pub bonus_delay: Duration,
    /// Bonus shown before the total is resolved (`TotalReveal`).
    pub total_delay: Duration,
    /// Final readout kept on screen before clearing (`Closing`).
    pub close_delay: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            animation_delay: Duration::from_millis(1200),
            bonus_delay: Duration::from_millis(600),
            total_delay: Duration::from_millis(600),
            close_delay: Duration::from_millis(1500),
        }
    }
}

impl SequencerConfig {
    /// Every phase advances immediately. Handy for headless callers.
    pub const fn instant() -> Self {
        Self {
            animation_delay: Duration::ZERO,
            bonus_delay: Duration::ZERO,
            total_delay: Duration::ZERO,
            close_delay: Duration::ZERO,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables (milliseconds, invalid values are ignored):
    /// - `DICE_ANIMATION_MS` - Rolling animation length (default: 1200)
    /// - `DICE_BONUS_MS` - Bonus reveal delay (default: 600)
    /// - `DICE_TOTAL_MS` - Total reveal delay (default: 600)
    /// - `DICE_CLOSE_MS` - Closing delay (default: 1500)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("DICE_ANIMATION_MS") {
            config.animation_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("DICE_BONUS_MS") {
            config.bonus_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("DICE_TOTAL_MS") {
            config.total_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("DICE_CLOSE_MS") {
            config.close_delay = Duration::from_millis(ms);
        }

        config
    }
}

/// Configuration for a whole roll session.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub sequencer: SequencerConfig,
    /// Seed for reproducible rolls; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub const fn new(sequencer: SequencerConfig) -> Self {
        Self {
            sequencer,
            seed: None,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Reads [`SequencerConfig::from_env`] plus:
    /// - `DICE_SEED` - Seed for reproducible rolls (default: random)
    pub fn from_env() -> Self {
        Self {
            sequencer: SequencerConfig::from_env(),
            seed: read_env::<u64>("DICE_SEED"),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
