/// Second-chance replacement: one reference bit per frame and a hand that
/// sweeps the frames in a circle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockPolicy {
    hand: usize,
    referenced: Vec<bool>,
}

impl ClockPolicy {
    pub fn new(nframes: usize) -> Self {
        Self {
            hand: 0,
            referenced: vec![false; nframes],
        }
    }

    pub fn hand(&self) -> usize {
        self.hand
    }

    pub fn reference_bit(&self, frame: usize) -> bool {
        self.referenced[frame]
    }

    pub fn len(&self) -> usize {
        self.referenced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.referenced.is_empty()
    }

    pub fn record_use(&mut self, frame: usize) {
        self.referenced[frame] = true;
    }

    /// Clears set bits under the hand until it finds a clear one. Ends within
    /// two revolutions.
    pub fn select_victim(&mut self) -> usize {
        loop {
            let frame = self.hand;
            self.advance();
            if self.referenced[frame] {
                log::trace!("clock: second chance for frame {}", frame);
                self.referenced[frame] = false;
            } else {
                return frame;
            }
        }
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.referenced.len();
    }
}
