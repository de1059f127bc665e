//==================================================================================================
// Imports
//==================================================================================================
use std::fmt;

use crate::{policy::PolicyKind, workload::Workload};

//==================================================================================================
// Structures
//==================================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Wrong number of arguments, or help was asked for.
    Usage,
    InvalidNumber(String),
    Zero(&'static str),
    UnknownPolicy(String),
    UnknownWorkload(String),
    InvalidSeed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Usage => write!(f, "wrong usage"),
            ConfigError::InvalidNumber(s) => write!(f, "not a number: {}", s),
            ConfigError::Zero(what) => write!(f, "{} must be at least 1", what),
            ConfigError::UnknownPolicy(s) => write!(f, "unknown algorithm: {}", s),
            ConfigError::UnknownWorkload(s) => write!(f, "unknown program: {}", s),
            ConfigError::InvalidSeed(s) => write!(f, "invalid {}: {}", Args::SEED_VAR, s),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Pages in the virtual address space (and blocks on the disk)
    npages: usize,
    /// Physical frames backing them
    nframes: usize,
    policy: PolicyKind,
    workload: Workload,
    /// Seeds the random replacement policy
    seed: u64,
}

//==================================================================================================
// Implementation
//==================================================================================================
impl Args {
    const OPT_HELP: &'static str = "--help";
    pub const SEED_VAR: &'static str = "VIRTMEM_SEED";
    const DEFAULT_SEED: u64 = 1;

    /// `args` includes the program name. `seed` is the raw value of
    /// [`Args::SEED_VAR`], if set.
    pub fn parse(args: &[String], seed: Option<&str>) -> Result<Self, ConfigError> {
        if args.len() != 5 || args.iter().any(|a| a == Self::OPT_HELP) {
            return Err(ConfigError::Usage);
        }

        let npages = Self::parse_count(&args[1], "npages")?;
        let nframes = Self::parse_count(&args[2], "nframes")?;
        let policy = args[3].parse::<PolicyKind>()?;
        let workload = args[4].parse::<Workload>()?;
        let seed = match seed {
            Some(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed(s.to_string()))?,
            None => Self::DEFAULT_SEED,
        };

        Ok(Self {
            npages,
            nframes,
            policy,
            workload,
            seed,
        })
    }

    fn parse_count(arg: &str, what: &'static str) -> Result<usize, ConfigError> {
        let n = arg
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidNumber(arg.to_string()))?;
        if n == 0 {
            return Err(ConfigError::Zero(what));
        }
        Ok(n)
    }

    pub fn usage(program_name: &str) {
        eprintln!(
            "use: {} <npages> <nframes> <rand|clock|custom> <alpha|beta|gamma|delta>",
            program_name
        );
    }

    pub fn number_of_pages(&self) -> usize {
        self.npages
    }

    pub fn number_of_frames(&self) -> usize {
        self.nframes
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn workload(&self) -> Workload {
        self.workload
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
