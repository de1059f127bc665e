//! Synthetic programs that touch virtual memory in characteristic patterns.
//! Each one is seeded internally, so a given geometry always produces the
//! same sequence of accesses (and the same checksum).

use std::{fmt, str::FromStr};

use page_table::{AccessError, FaultHandler, VirtualMemory};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::args::ConfigError;

const ALPHA_SEED: u64 = 38290;
const BETA_SEED: u64 = 93282;
const GAMMA_SEED: u64 = 14137;
const DELTA_SEED: u64 = 77203;

const ALPHA_ROUNDS: usize = 100;
const ALPHA_WRITES: usize = 100;
const ALPHA_WINDOW: u64 = 25;
const GAMMA_PASSES: usize = 10;
const DELTA_SWAPS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Bursts of random writes clustered in small windows.
    Alpha,
    /// Random fill, then an in-place sort of the whole space.
    Beta,
    /// Dot product of two vectors filling each half of the space.
    Gamma,
    /// Random byte swaps across the whole space.
    Delta,
}

impl FromStr for Workload {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alpha" => Ok(Workload::Alpha),
            "beta" => Ok(Workload::Beta),
            "gamma" => Ok(Workload::Gamma),
            "delta" => Ok(Workload::Delta),
            _ => Err(ConfigError::UnknownWorkload(s.to_string())),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Workload::Alpha => "alpha",
            Workload::Beta => "beta",
            Workload::Gamma => "gamma",
            Workload::Delta => "delta",
        };
        f.write_str(name)
    }
}

type Access<T, H, const PAGE_SIZE: usize> =
    Result<T, AccessError<<H as FaultHandler<PAGE_SIZE>>::Error>>;

impl Workload {
    /// Run the program against `vm` and return its checksum.
    pub fn run<H, const PAGE_SIZE: usize>(
        &self,
        vm: &mut VirtualMemory<H, PAGE_SIZE>,
    ) -> Access<u64, H, PAGE_SIZE>
    where
        H: FaultHandler<PAGE_SIZE>,
    {
        log::info!("running {} over {} bytes", self, vm.len());
        match self {
            Workload::Alpha => alpha(vm),
            Workload::Beta => beta(vm),
            Workload::Gamma => gamma(vm),
            Workload::Delta => delta(vm),
        }
    }
}

fn alpha<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
) -> Access<u64, H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    let length = vm.len() as u64;
    let mut rng = StdRng::seed_from_u64(ALPHA_SEED);
    for _ in 0..ALPHA_ROUNDS {
        let start = rng.gen_range(0..length);
        for _ in 0..ALPHA_WRITES {
            let address = (start + rng.gen_range(0..ALPHA_WINDOW)) % length;
            vm.write_u8(address, rng.gen())?;
        }
    }
    sum(vm)
}

fn beta<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
) -> Access<u64, H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    let length = vm.len() as u64;
    let mut rng = StdRng::seed_from_u64(BETA_SEED);
    for address in 0..length {
        vm.write_u8(address, rng.gen())?;
    }
    heap_sort(vm, length)?;
    sum(vm)
}

fn gamma<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
) -> Access<u64, H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    let words = vm.len() as u64 / 2 / 4;
    let a = 0;
    let b = words * 4;
    let mut rng = StdRng::seed_from_u64(GAMMA_SEED);
    for i in 0..words {
        vm.write_u32(a + i * 4, rng.gen())?;
        vm.write_u32(b + i * 4, rng.gen())?;
    }

    let mut total: u64 = 0;
    for _ in 0..GAMMA_PASSES {
        for i in 0..words {
            let x = vm.read_u32(a + i * 4)? as u64;
            let y = vm.read_u32(b + i * 4)? as u64;
            total = total.wrapping_add(x * y);
        }
    }
    Ok(total)
}

fn delta<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
) -> Access<u64, H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    let length = vm.len() as u64;
    for address in 0..length {
        vm.write_u8(address, address as u8)?;
    }
    let mut rng = StdRng::seed_from_u64(DELTA_SEED);
    for _ in 0..DELTA_SWAPS {
        let i = rng.gen_range(0..length);
        let j = rng.gen_range(0..length);
        swap(vm, i, j)?;
    }
    sum(vm)
}

fn sum<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
) -> Access<u64, H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    let mut total = 0;
    for address in 0..vm.len() as u64 {
        total += vm.read_u8(address)? as u64;
    }
    Ok(total)
}

fn swap<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
    i: u64,
    j: u64,
) -> Access<(), H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    let x = vm.read_u8(i)?;
    let y = vm.read_u8(j)?;
    vm.write_u8(i, y)?;
    vm.write_u8(j, x)
}

fn heap_sort<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
    length: u64,
) -> Access<(), H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    for root in (0..length / 2).rev() {
        sift_down(vm, root, length)?;
    }
    for end in (1..length).rev() {
        swap(vm, 0, end)?;
        sift_down(vm, 0, end)?;
    }
    Ok(())
}

fn sift_down<H, const PAGE_SIZE: usize>(
    vm: &mut VirtualMemory<H, PAGE_SIZE>,
    mut root: u64,
    end: u64,
) -> Access<(), H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return Ok(());
        }
        if child + 1 < end && vm.read_u8(child)? < vm.read_u8(child + 1)? {
            child += 1;
        }
        if vm.read_u8(root)? >= vm.read_u8(child)? {
            return Ok(());
        }
        swap(vm, root, child)?;
        root = child;
    }
}
