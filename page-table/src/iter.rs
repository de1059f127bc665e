use super::PageTableEntry;

/// Walks the resident part of a page table, yielding `(page, frame)` pairs in
/// page order.
pub struct ResidentPages<'a> {
    current: usize,
    entries: &'a [PageTableEntry],
}

impl<'a> ResidentPages<'a> {
    pub fn new(entries: &'a [PageTableEntry]) -> Self {
        Self {
            current: 0,
            entries,
        }
    }
}

impl<'a> Iterator for ResidentPages<'a> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = self.entries.get(self.current) {
            let page = self.current;
            self.current += 1;
            if entry.is_present() {
                return Some((page, entry.get_frame_number() as usize));
            }
        }
        None
    }
}
