/// Which page, if any, occupies each physical frame, with a page ---> frame
/// reverse index kept in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    frames: Vec<Option<usize>>,
    reverse: Vec<Option<usize>>,
}

impl FrameTable {
    pub fn new(nframes: usize, npages: usize) -> Self {
        Self {
            frames: vec![None; nframes],
            reverse: vec![None; npages],
        }
    }

    pub fn nframes(&self) -> usize {
        self.frames.len()
    }

    pub fn npages(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_free(&self, frame: usize) -> bool {
        self.frames[frame].is_none()
    }

    /// Lowest numbered free frame.
    pub fn find_free(&self) -> Option<usize> {
        let free = self.frames.iter().position(Option::is_none);
        if free.is_none() {
            log::debug!("No free frames");
        }
        free
    }

    pub fn page_at(&self, frame: usize) -> Option<usize> {
        self.frames[frame]
    }

    pub fn frame_of(&self, page: usize) -> Option<usize> {
        self.reverse.get(page).copied().flatten()
    }

    /// Put `page` in `frame`. Whatever the frame held before loses its
    /// reverse entry.
    pub fn assign(&mut self, frame: usize, page: usize) {
        if let Some(previous) = self.frames[frame].replace(page) {
            self.reverse[previous] = None;
        }
        self.reverse[page] = Some(frame);
    }

    pub fn release(&mut self, frame: usize) -> Option<usize> {
        let page = self.frames[frame].take()?;
        self.reverse[page] = None;
        Some(page)
    }

    /// `(frame, page)` for every occupied frame, in frame order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter_map(|(frame, page)| page.map(|page| (frame, page)))
    }
}
