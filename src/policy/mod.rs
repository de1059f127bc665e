mod age;
mod clock;

use std::{fmt, str::FromStr};

use rand::{rngs::StdRng, Rng, SeedableRng};

pub use age::AgePolicy;
pub use clock::ClockPolicy;

use crate::args::ConfigError;

/// Replacement algorithm as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Random,
    Clock,
    Custom,
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rand" => Ok(PolicyKind::Random),
            "clock" => Ok(PolicyKind::Clock),
            "custom" => Ok(PolicyKind::Custom),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Random => "rand",
            PolicyKind::Clock => "clock",
            PolicyKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Replacement state for one run. The variant is fixed when the pager is
/// built.
#[derive(Debug, Clone)]
pub enum Policy {
    Random { rng: StdRng, nframes: usize },
    Clock(ClockPolicy),
    Custom(AgePolicy),
}

impl Policy {
    pub fn new(kind: PolicyKind, nframes: usize, seed: u64) -> Self {
        match kind {
            PolicyKind::Random => Policy::Random {
                rng: StdRng::seed_from_u64(seed),
                nframes,
            },
            PolicyKind::Clock => Policy::Clock(ClockPolicy::new(nframes)),
            PolicyKind::Custom => Policy::Custom(AgePolicy::new(nframes)),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Random { .. } => PolicyKind::Random,
            Policy::Clock(_) => PolicyKind::Clock,
            Policy::Custom(_) => PolicyKind::Custom,
        }
    }

    /// Number of frames the policy keeps state for.
    pub fn nframes(&self) -> usize {
        match self {
            Policy::Random { nframes, .. } => *nframes,
            Policy::Clock(clock) => clock.len(),
            Policy::Custom(ages) => ages.len(),
        }
    }

    /// Pick the frame to evict. Only called when every frame is occupied.
    pub fn select_victim(&mut self) -> usize {
        match self {
            Policy::Random { rng, nframes } => rng.gen_range(0..*nframes),
            Policy::Clock(clock) => clock.select_victim(),
            Policy::Custom(ages) => ages.select_victim(),
        }
    }

    /// Note that a page was just loaded into `frame`.
    pub fn record_use(&mut self, frame: usize) {
        match self {
            Policy::Random { .. } => {}
            Policy::Clock(clock) => clock.record_use(frame),
            Policy::Custom(ages) => ages.record_use(frame),
        }
    }
}
