mod iter;
mod page_table_entry;
mod virtual_memory;

use std::fmt;

use memory::PhysicalMemory;

pub use iter::ResidentPages;
pub use page_table_entry::{PageTableEntry, BIT_DIRTY, BIT_PRESENT, BIT_WRITE};
pub use virtual_memory::{AccessError, VirtualMemory};

#[derive(Debug, PartialEq)]
pub enum PageTableError {
    /// A page table needs at least one page and one frame.
    Empty,
    /// The address space or the frame pool cannot be sized or allocated.
    TooLarge,
}

impl fmt::Display for PageTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageTableError::Empty => write!(f, "page table needs at least one page and one frame"),
            PageTableError::TooLarge => write!(f, "address space or physical memory too large"),
        }
    }
}

impl std::error::Error for PageTableError {}

/// Called by [`VirtualMemory`] whenever an access touches a page that is not
/// marked present. On success the handler is expected to have mapped `page`.
pub trait FaultHandler<const PAGE_SIZE: usize> {
    type Error;

    fn page_fault(&mut self, pt: &mut PageTable<PAGE_SIZE>, page: usize) -> Result<(), Self::Error>;
}

/// Page number ---> (frame number, bits), plus the physical frames the
/// mapped pages live in.
#[derive(Debug, Clone)]
pub struct PageTable<const PAGE_SIZE: usize> {
    entries: Vec<PageTableEntry>,
    physmem: PhysicalMemory<PAGE_SIZE>,
}

impl<const PAGE_SIZE: usize> PageTable<PAGE_SIZE> {
    pub fn create(npages: usize, nframes: usize) -> Result<Self, PageTableError> {
        if npages == 0 || nframes == 0 {
            return Err(PageTableError::Empty);
        }
        // Virtual addresses must fit in a usize.
        npages
            .checked_mul(PAGE_SIZE)
            .ok_or(PageTableError::TooLarge)?;
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(npages)
            .map_err(|_| PageTableError::TooLarge)?;
        entries.resize(npages, PageTableEntry::zero());
        let physmem = PhysicalMemory::new(nframes).map_err(|_| PageTableError::TooLarge)?;
        Ok(Self { entries, physmem })
    }

    pub fn npages(&self) -> usize {
        self.entries.len()
    }

    pub fn nframes(&self) -> usize {
        self.physmem.frames()
    }

    pub fn get_entry(&self, page_number: usize) -> Option<PageTableEntry> {
        self.entries.get(page_number).copied()
    }

    pub fn get_frame(&self, page_number: usize) -> Option<usize> {
        let entry = self.get_entry(page_number)?;
        if entry.is_present() {
            Some(entry.get_frame_number() as usize)
        } else {
            None
        }
    }

    /// Panics if `page_number` is outside the table.
    pub fn set_entry(&mut self, page_number: usize, frame_number: usize, bits: u8) {
        log::trace!("page {} -> frame {} bits {:#05b}", page_number, frame_number, bits);
        self.entries[page_number] = PageTableEntry::new(frame_number as u32, bits);
    }

    pub(crate) fn set_dirty(&mut self, page_number: usize) {
        let entry = &mut self.entries[page_number];
        entry.set_bits(entry.bits() | BIT_DIRTY);
    }

    pub fn resident(&self) -> ResidentPages<'_> {
        ResidentPages::new(&self.entries)
    }

    pub fn physmem(&self) -> &PhysicalMemory<PAGE_SIZE> {
        &self.physmem
    }

    pub fn physmem_mut(&mut self) -> &mut PhysicalMemory<PAGE_SIZE> {
        &mut self.physmem
    }
}
