//! Demand-paged virtual memory simulator.
//!
//! A small pool of physical frames backs a larger virtual address space.
//! Pages are read from a disk image on first touch and, once every frame is
//! taken, a replacement policy picks a frame to evict (writing it back if it
//! was modified).

pub mod args;
pub mod frame_table;
pub mod pager;
pub mod policy;
pub mod workload;

use disk::Disk;
use page_table::{PageTable, VirtualMemory};

pub use args::{Args, ConfigError};
pub use frame_table::FrameTable;
pub use pager::{Pager, PagerError, Stats};
pub use policy::{Policy, PolicyKind};
pub use workload::Workload;

pub const PAGE_SIZE: usize = 4096;
pub const DISK_NAME: &str = "myvirtualdisk";

pub type Simulation<const PAGE_BYTES: usize> = VirtualMemory<Pager<PAGE_BYTES>, PAGE_BYTES>;

/// Wire a fresh disk image, page table and pager together.
pub fn build<const PAGE_BYTES: usize>(
    disk: Disk<PAGE_BYTES>,
    npages: usize,
    nframes: usize,
    policy: PolicyKind,
    seed: u64,
) -> Result<Simulation<PAGE_BYTES>, PagerError> {
    let table = PageTable::create(npages, nframes)
        .map_err(|e| PagerError::Config(e.to_string()))?;
    let pager = Pager::new(disk, npages, nframes, Policy::new(policy, nframes, seed))?;
    Ok(VirtualMemory::new(table, pager))
}
