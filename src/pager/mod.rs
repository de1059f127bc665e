#[cfg(test)]
mod tests;

use std::fmt;

use disk::{Disk, DiskError};
use log::debug;
use memory::MemoryError;
use page_table::{FaultHandler, PageTable, BIT_DIRTY, BIT_PRESENT, BIT_WRITE};

use crate::{frame_table::FrameTable, policy::Policy};

#[derive(Debug, PartialEq)]
pub enum PagerError {
    /// The fault was raised for a page that is already mapped. The page
    /// table's fault detection is broken and the run cannot continue.
    AlreadyPresent { page: usize },
    /// The policy picked a frame the frame table says is free, so the frame
    /// table and the policy disagree about which frames are occupied.
    EmptyVictim { frame: usize },
    PageOutOfRange(usize),
    Disk(DiskError),
    Memory(MemoryError),
    Config(String),
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagerError::AlreadyPresent { page } => write!(f, "page {} is already present", page),
            PagerError::EmptyVictim { frame } => write!(f, "victim frame {} holds no page", frame),
            PagerError::PageOutOfRange(page) => {
                write!(f, "page {} is outside the address space", page)
            }
            PagerError::Disk(e) => write!(f, "{}", e),
            PagerError::Memory(e) => write!(f, "{}", e),
            PagerError::Config(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for PagerError {}

impl From<DiskError> for PagerError {
    fn from(e: DiskError) -> Self {
        PagerError::Disk(e)
    }
}

impl From<MemoryError> for PagerError {
    fn from(e: MemoryError) -> Self {
        PagerError::Memory(e)
    }
}

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub page_faults: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "page faults: {}", self.page_faults)?;
        writeln!(f, "disk reads: {}", self.disk_reads)?;
        write!(f, "disk writes: {}", self.disk_writes)
    }
}

/// Resolves page faults: loads the faulting page from disk into a free frame,
/// or evicts a victim picked by the replacement policy to make room.
///
/// The frame table and the page table always agree: frame `f` holds page `p`
/// exactly when `p` is present in the page table with frame number `f`.
#[derive(Debug)]
pub struct Pager<const PAGE_SIZE: usize> {
    disk: Disk<PAGE_SIZE>,
    frames: FrameTable,
    policy: Policy,
    stats: Stats,
}

impl<const PAGE_SIZE: usize> Pager<PAGE_SIZE> {
    pub fn new(
        disk: Disk<PAGE_SIZE>,
        npages: usize,
        nframes: usize,
        policy: Policy,
    ) -> Result<Self, PagerError> {
        if npages == 0 || nframes == 0 {
            return Err(PagerError::Config(String::from(
                "need at least one page and one frame",
            )));
        }
        if disk.blocks() < npages {
            return Err(PagerError::Config(format!(
                "disk has {} blocks but {} pages were requested",
                disk.blocks(),
                npages
            )));
        }
        if policy.nframes() != nframes {
            return Err(PagerError::Config(format!(
                "{} policy sized for {} frames, expected {}",
                policy.kind(),
                policy.nframes(),
                nframes
            )));
        }
        Ok(Self {
            disk,
            frames: FrameTable::new(nframes, npages),
            policy,
            stats: Stats::default(),
        })
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn disk(&self) -> &Disk<PAGE_SIZE> {
        &self.disk
    }

    pub fn into_disk(self) -> Disk<PAGE_SIZE> {
        self.disk
    }

    /// Bring `page` into `frame` and map it read/write.
    fn load(
        &mut self,
        pt: &mut PageTable<PAGE_SIZE>,
        page: usize,
        frame: usize,
    ) -> Result<(), PagerError> {
        self.disk.read_block(page, pt.physmem_mut().frame_mut(frame)?)?;
        self.stats.disk_reads += 1;
        pt.set_entry(page, frame, BIT_PRESENT | BIT_WRITE);
        self.frames.assign(frame, page);
        self.policy.record_use(frame);
        Ok(())
    }

    /// Empty `frame`, writing its page back first if it was modified.
    fn evict(&mut self, pt: &mut PageTable<PAGE_SIZE>, frame: usize) -> Result<usize, PagerError> {
        let page = self
            .frames
            .page_at(frame)
            .ok_or(PagerError::EmptyVictim { frame })?;
        let entry = pt.get_entry(page).ok_or(PagerError::PageOutOfRange(page))?;
        if entry.is_dirty() {
            debug!("writing back dirty page {} from frame {}", page, frame);
            self.disk.write_block(page, pt.physmem().frame(frame)?)?;
            self.stats.disk_writes += 1;
        }
        pt.set_entry(page, 0, 0);
        self.frames.release(frame);
        Ok(page)
    }

    /// Write every resident modified page to disk and mark it clean. Pages
    /// stay resident.
    pub fn flush(&mut self, pt: &mut PageTable<PAGE_SIZE>) -> Result<(), PagerError> {
        let resident: Vec<(usize, usize)> = self.frames.occupied().collect();
        for (frame, page) in resident {
            let entry = pt.get_entry(page).ok_or(PagerError::PageOutOfRange(page))?;
            if entry.is_dirty() {
                self.disk.write_block(page, pt.physmem().frame(frame)?)?;
                self.stats.disk_writes += 1;
                pt.set_entry(page, frame, entry.bits() & !BIT_DIRTY);
            }
        }
        Ok(())
    }
}

impl<const PAGE_SIZE: usize> FaultHandler<PAGE_SIZE> for Pager<PAGE_SIZE> {
    type Error = PagerError;

    fn page_fault(&mut self, pt: &mut PageTable<PAGE_SIZE>, page: usize) -> Result<(), PagerError> {
        self.stats.page_faults += 1;

        if page >= self.frames.npages() {
            return Err(PagerError::PageOutOfRange(page));
        }
        let entry = pt.get_entry(page).ok_or(PagerError::PageOutOfRange(page))?;
        if entry.is_present() {
            return Err(PagerError::AlreadyPresent { page });
        }

        if let Some(frame) = self.frames.find_free() {
            debug!("page fault on {}: free frame {}", page, frame);
            return self.load(pt, page, frame);
        }

        let victim = self.policy.select_victim();
        let evicted = self.evict(pt, victim)?;
        debug!(
            "page fault on {}: evicted page {} from frame {} ({})",
            page,
            evicted,
            victim,
            self.policy.kind()
        );
        self.load(pt, page, victim)
    }
}
