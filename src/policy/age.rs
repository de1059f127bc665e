/// Oldest-load-first replacement. Every load stamps its frame with the next
/// value of a shared counter; the victim is the frame with the smallest stamp.
///
/// Stamps record when a page was loaded, not when it was last touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgePolicy {
    ticks: u64,
    ages: Vec<u64>,
}

impl AgePolicy {
    pub fn new(nframes: usize) -> Self {
        Self {
            ticks: 0,
            ages: vec![0; nframes],
        }
    }

    /// Last stamp handed out.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn age(&self, frame: usize) -> u64 {
        self.ages[frame]
    }

    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    pub fn record_use(&mut self, frame: usize) {
        self.ticks += 1;
        self.ages[frame] = self.ticks;
    }

    /// Lowest stamp; the first one found on a tie.
    pub fn select_victim(&self) -> usize {
        let mut oldest_frame = 0;
        let mut oldest_age = u64::MAX;
        for (frame, &age) in self.ages.iter().enumerate() {
            if age < oldest_age {
                oldest_age = age;
                oldest_frame = frame;
            }
        }
        oldest_frame
    }
}
