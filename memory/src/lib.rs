use std::fmt;

#[derive(Debug, PartialEq)]
pub enum MemoryError {
    OverCapacity,
    /// The requested pool cannot be sized or allocated.
    TooLarge,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OverCapacity => write!(f, "physical address out of range"),
            MemoryError::TooLarge => write!(f, "physical memory too large to allocate"),
        }
    }
}

impl std::error::Error for MemoryError {}

/// The physical frame pool: `frames` frames of `FRAME_SIZE` bytes each,
/// laid out contiguously.
#[derive(Debug, Clone)]
pub struct PhysicalMemory<const FRAME_SIZE: usize> {
    buffer: Vec<u8>,
    frames: usize,
}

impl<const FRAME_SIZE: usize> PhysicalMemory<FRAME_SIZE> {
    pub fn new(frames: usize) -> Result<Self, MemoryError> {
        let len = frames
            .checked_mul(FRAME_SIZE)
            .ok_or(MemoryError::TooLarge)?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| MemoryError::TooLarge)?;
        buffer.resize(len, 0);
        Ok(Self { buffer, frames })
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn check_address(&self, address: u64) -> Result<(), MemoryError> {
        if address as usize >= self.capacity() {
            return Err(MemoryError::OverCapacity);
        }
        Ok(())
    }

    fn check_frame(&self, frame_number: usize) -> Result<(), MemoryError> {
        if frame_number >= self.frames {
            return Err(MemoryError::OverCapacity);
        }
        Ok(())
    }

    pub fn frame(&self, frame_number: usize) -> Result<&[u8], MemoryError> {
        self.check_frame(frame_number)?;
        Ok(&self.buffer[frame_number * FRAME_SIZE..(frame_number + 1) * FRAME_SIZE])
    }

    pub fn frame_mut(&mut self, frame_number: usize) -> Result<&mut [u8], MemoryError> {
        self.check_frame(frame_number)?;
        Ok(&mut self.buffer[frame_number * FRAME_SIZE..(frame_number + 1) * FRAME_SIZE])
    }

    pub fn read_u8(&self, address: u64) -> Result<u8, MemoryError> {
        self.check_address(address)?;
        Ok(self.buffer[address as usize])
    }

    pub fn write_u8(&mut self, address: u64, byte: u8) -> Result<(), MemoryError> {
        self.check_address(address)?;
        self.buffer[address as usize] = byte;
        Ok(())
    }
}
