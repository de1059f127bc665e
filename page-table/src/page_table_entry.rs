pub const BIT_PRESENT: u8 = 1 << 0;
pub const BIT_WRITE: u8 = 1 << 1;
pub const BIT_DIRTY: u8 = 1 << 2;

/// This table maps a virtual page to the frame in physical memory holding it
/// Each entry represent a map from page ---> frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTableEntry {
    /// | frame number: u32 | bits: u8 |
    pub(super) entry: [u8; 5],
}

impl PageTableEntry {
    pub(super) fn zero() -> Self {
        PageTableEntry { entry: [0; 5] }
    }

    pub(super) fn new(frame_number: u32, bits: u8) -> Self {
        let mut entry = Self::zero();
        entry.set_frame_number(frame_number);
        entry.set_bits(bits);
        entry
    }

    pub fn get_frame_number(&self) -> u32 {
        u32::from_be_bytes(self.entry[0..4].try_into().unwrap())
    }

    pub(super) fn set_frame_number(&mut self, frame_number: u32) {
        self.entry[0..4].copy_from_slice(&frame_number.to_be_bytes());
    }

    pub fn bits(&self) -> u8 {
        self.entry[4]
    }

    pub(super) fn set_bits(&mut self, bits: u8) {
        self.entry[4] = bits;
    }

    pub fn is_present(&self) -> bool {
        self.bits() & BIT_PRESENT != 0
    }

    pub fn is_writable(&self) -> bool {
        self.bits() & BIT_WRITE != 0
    }

    pub fn is_dirty(&self) -> bool {
        self.bits() & BIT_DIRTY != 0
    }
}
