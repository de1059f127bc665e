use std::{
    fmt,
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write},
    mem::size_of,
};

use log::info;

#[derive(Debug, PartialEq)]
pub enum DiskError {
    IncorrectBlockSize,
    OverCapacity,
    Io(io::ErrorKind),
}

impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskError::IncorrectBlockSize => write!(f, "buffer does not match the disk block size"),
            DiskError::OverCapacity => write!(f, "block number is past the end of the disk"),
            DiskError::Io(kind) => write!(f, "disk i/o failed: {}", kind),
        }
    }
}

impl std::error::Error for DiskError {}

impl From<io::Error> for DiskError {
    fn from(e: io::Error) -> Self {
        DiskError::Io(e.kind())
    }
}

const HEADER_SIZE: usize = size_of::<u32>() * 2;

/// A virtual disk holding `blocks` blocks of `BLOCKSIZE` bytes, backed by a file.
/// Blocks are addressed by page number.
#[derive(Debug)]
pub struct Disk<const BLOCKSIZE: usize> {
    file_name: String,
    file: File,
    blocks: usize,
}

pub fn make_name(name: &str) -> String {
    let name = name.replace("-", "_");
    let mut disk_name = String::from("DISK_IMAGE_");
    disk_name.push_str(&name);
    disk_name
}

fn write_header(file: &mut File, block_size: u32, blocks: u32) -> Result<(), io::Error> {
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&block_size.to_be_bytes())?;
    file.write_all(&blocks.to_be_bytes())?;
    Ok(())
}

fn read_header(file: &mut File) -> Result<(u32, u32), io::Error> {
    let mut block_size = [0; size_of::<u32>()];
    let mut blocks = [0; size_of::<u32>()];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut block_size)?;
    file.read_exact(&mut blocks)?;
    Ok((u32::from_be_bytes(block_size), u32::from_be_bytes(blocks)))
}

impl<const BLOCKSIZE: usize> Disk<BLOCKSIZE> {
    /// Create a fresh, zero-filled disk image. An existing image with the same
    /// name is truncated.
    pub fn create(name: &str, blocks: usize) -> Result<Self, io::Error> {
        let too_large = || {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("disk of {} blocks of {} bytes is too large", blocks, BLOCKSIZE),
            )
        };
        let len = blocks
            .checked_mul(BLOCKSIZE)
            .and_then(|bytes| bytes.checked_add(HEADER_SIZE))
            .ok_or_else(too_large)?;
        let header_blocks = u32::try_from(blocks).map_err(|_| too_large())?;
        let mut file = File::options()
            .truncate(true)
            .write(true)
            .read(true)
            .create(true)
            .open(make_name(name))?;
        file.set_len(len as u64)?;
        write_header(&mut file, BLOCKSIZE as u32, header_blocks)?;
        info!("Created disk {} with {} blocks", make_name(name), blocks);
        Ok(Self {
            file_name: String::from(name),
            file,
            blocks,
        })
    }

    /// Reopen an image written by [`Disk::create`]. The stored geometry must
    /// match `BLOCKSIZE` and `blocks`.
    pub fn connect(name: &str, blocks: usize) -> Result<Self, io::Error> {
        let mut file = File::options()
            .write(true)
            .read(true)
            .open(make_name(name))?;
        let (block_size, stored_blocks) = read_header(&mut file)?;
        if block_size as usize != BLOCKSIZE || stored_blocks as usize != blocks {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "disk geometry mismatch: found {}x{}, expected {}x{}",
                    stored_blocks, block_size, blocks, BLOCKSIZE
                ),
            ));
        }
        Ok(Self {
            file_name: String::from(name),
            file,
            blocks,
        })
    }

    pub fn name(&self) -> &str {
        &self.file_name
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    fn seek_block(&mut self, block_number: usize) -> Result<(), DiskError> {
        self.file.seek(SeekFrom::Start(
            HEADER_SIZE as u64 + (block_number * BLOCKSIZE) as u64,
        ))?;
        Ok(())
    }

    pub fn read_block(&mut self, block_number: usize, buf: &mut [u8]) -> Result<(), DiskError> {
        info!("Start reading block[{}]", block_number);
        if buf.len() != BLOCKSIZE {
            return Err(DiskError::IncorrectBlockSize);
        } else if block_number >= self.blocks {
            return Err(DiskError::OverCapacity);
        }
        self.seek_block(block_number)?;
        self.file.read_exact(buf)?;
        info!("Done reading block[{}]", block_number);
        Ok(())
    }

    pub fn write_block(&mut self, block_number: usize, block: &[u8]) -> Result<(), DiskError> {
        info!("Start writing block[{}]", block_number);
        if block.len() != BLOCKSIZE {
            return Err(DiskError::IncorrectBlockSize);
        } else if block_number >= self.blocks {
            return Err(DiskError::OverCapacity);
        }
        self.seek_block(block_number)?;
        self.file.write_all(block)?;
        info!("Done writing block[{}]", block_number);
        Ok(())
    }
}
