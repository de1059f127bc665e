use std::fmt;

use memory::MemoryError;

use super::{FaultHandler, PageTable};

#[derive(Debug, PartialEq)]
pub enum AccessError<E> {
    /// The virtual address lies past the end of the address space.
    OutOfRange(u64),
    /// Write to a resident page that is not writable.
    Protection(usize),
    /// The fault handler returned without mapping the page.
    Unresolved(usize),
    Memory(MemoryError),
    Fault(E),
}

impl<E: fmt::Display> fmt::Display for AccessError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::OutOfRange(addr) => write!(f, "virtual address {:#x} out of range", addr),
            AccessError::Protection(page) => write!(f, "write to read-only page {}", page),
            AccessError::Unresolved(page) => {
                write!(f, "fault handler returned without mapping page {}", page)
            }
            AccessError::Memory(e) => write!(f, "{}", e),
            AccessError::Fault(e) => write!(f, "page fault failed: {}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AccessError<E> {}

impl<E> From<MemoryError> for AccessError<E> {
    fn from(e: MemoryError) -> Self {
        AccessError::Memory(e)
    }
}

/// A virtual address space of `npages * PAGE_SIZE` bytes. Every access is
/// translated through the page table; accesses to non-present pages are
/// handed to the registered [`FaultHandler`] before being retried.
pub struct VirtualMemory<H, const PAGE_SIZE: usize> {
    table: PageTable<PAGE_SIZE>,
    handler: H,
}

impl<H, const PAGE_SIZE: usize> VirtualMemory<H, PAGE_SIZE>
where
    H: FaultHandler<PAGE_SIZE>,
{
    pub fn new(table: PageTable<PAGE_SIZE>, handler: H) -> Self {
        Self { table, handler }
    }

    /// Size of the address space in bytes.
    pub fn len(&self) -> usize {
        self.table.npages() * PAGE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table(&self) -> &PageTable<PAGE_SIZE> {
        &self.table
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Both halves at once, for callers that need to drive the handler
    /// against the table outside of an access.
    pub fn parts_mut(&mut self) -> (&mut PageTable<PAGE_SIZE>, &mut H) {
        (&mut self.table, &mut self.handler)
    }

    pub fn into_parts(self) -> (PageTable<PAGE_SIZE>, H) {
        (self.table, self.handler)
    }

    /// Translate `address`, faulting the page in if needed. Returns the
    /// physical address.
    fn translate(&mut self, address: u64, write: bool) -> Result<u64, AccessError<H::Error>> {
        if address as usize >= self.len() {
            return Err(AccessError::OutOfRange(address));
        }
        let page = address as usize / PAGE_SIZE;
        let offset = address as usize % PAGE_SIZE;

        let mut entry = self.table.entries[page];
        if !entry.is_present() {
            self.handler
                .page_fault(&mut self.table, page)
                .map_err(AccessError::Fault)?;
            entry = self.table.entries[page];
            if !entry.is_present() {
                return Err(AccessError::Unresolved(page));
            }
        }

        if write {
            if !entry.is_writable() {
                return Err(AccessError::Protection(page));
            }
            self.table.set_dirty(page);
        }
        Ok((entry.get_frame_number() as usize * PAGE_SIZE + offset) as u64)
    }

    pub fn read_u8(&mut self, address: u64) -> Result<u8, AccessError<H::Error>> {
        let physical = self.translate(address, false)?;
        Ok(self.table.physmem.read_u8(physical)?)
    }

    pub fn write_u8(&mut self, address: u64, byte: u8) -> Result<(), AccessError<H::Error>> {
        let physical = self.translate(address, true)?;
        self.table.physmem.write_u8(physical, byte)?;
        Ok(())
    }

    pub fn read_u32(&mut self, address: u64) -> Result<u32, AccessError<H::Error>> {
        let mut bytes = [0; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_u8(address + i as u64)?;
        }
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn write_u32(&mut self, address: u64, word: u32) -> Result<(), AccessError<H::Error>> {
        for (i, byte) in word.to_le_bytes().into_iter().enumerate() {
            self.write_u8(address + i as u64, byte)?;
        }
        Ok(())
    }
}
