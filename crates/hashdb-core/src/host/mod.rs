//! The host analysis environment's memory and type surface.
//!
//! Hash values live at addresses inside the analyzed binary; reading them
//! and guessing how wide they are belongs to the host environment, not to
//! this crate. [`HostMemory`] is that seam. Implementations wrap whatever
//! database the host exposes; [`MockHostMemory`] backs tests with a plain
//! byte buffer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::AlgorithmWidth;

/// Width of a fixed-width unsigned read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReadWidth {
    /// 8-bit read.
    B8,
    /// 16-bit read.
    B16,
    /// 32-bit read.
    B32,
    /// 64-bit read.
    B64,
}

impl ReadWidth {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::B8 => 8,
            Self::B16 => 16,
            Self::B32 => 32,
            Self::B64 => 64,
        }
    }

    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self.bits() / 8
    }
}

impl From<AlgorithmWidth> for ReadWidth {
    /// The read width matching an algorithm's hash width.
    fn from(width: AlgorithmWidth) -> Self {
        match width {
            AlgorithmWidth::U32 => Self::B32,
            AlgorithmWidth::U64 => Self::B64,
        }
    }
}

impl fmt::Display for ReadWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

/// Primitive kind the host infers for an address.
///
/// The set is closed; any declared type outside the known table reads as
/// [`DataType::Unknown`] rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    /// 8-bit integer.
    Byte,
    /// 16-bit integer.
    Word,
    /// 32-bit integer.
    Dword,
    /// 64-bit integer.
    Qword,
    /// 32-bit float.
    Float,
    /// Nothing usable could be inferred.
    Unknown,
}

impl DataType {
    /// Maps a host-declared type name to a primitive kind.
    #[must_use]
    pub fn from_declared_type(name: &str) -> Self {
        match name {
            "__int64" => Self::Qword,
            "int" => Self::Dword,
            "float" => Self::Float,
            "__int16" => Self::Word,
            "char" => Self::Byte,
            _ => Self::Unknown,
        }
    }

    /// The unsigned read width for this kind, when it has one.
    ///
    /// `Float` and `Unknown` have no unsigned reading.
    #[must_use]
    pub const fn read_width(self) -> Option<ReadWidth> {
        match self {
            Self::Byte => Some(ReadWidth::B8),
            Self::Word => Some(ReadWidth::B16),
            Self::Dword => Some(ReadWidth::B32),
            Self::Qword => Some(ReadWidth::B64),
            Self::Float | Self::Unknown => None,
        }
    }
}

/// A read outside the mapped address space.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("out of bounds {width} read at {address:#x}")]
pub struct OutOfBoundsRead {
    /// Address the read started at.
    pub address: u64,
    /// Width of the attempted read.
    pub width: ReadWidth,
}

/// Fixed-width reads and best-effort type inference over the analyzed
/// binary.
pub trait HostMemory {
    /// Reads an unsigned integer of the given width at `address`,
    /// little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBoundsRead`] if the range is not mapped.
    fn read_unsigned(&self, address: u64, width: ReadWidth) -> Result<u64, OutOfBoundsRead>;

    /// Best-effort type inference at `address`. Total: unmapped or
    /// undecidable addresses answer [`DataType::Unknown`].
    fn infer_type(&self, address: u64) -> DataType;
}

/// Byte-buffer-backed host memory for tests.
#[derive(Debug, Default)]
pub struct MockHostMemory {
    base: u64,
    bytes: Vec<u8>,
    types: BTreeMap<u64, DataType>,
}

impl MockHostMemory {
    /// Maps `bytes` starting at `base`.
    #[must_use]
    pub fn new(base: u64, bytes: Vec<u8>) -> Self {
        Self {
            base,
            bytes,
            types: BTreeMap::new(),
        }
    }

    /// Declares the inferred type at an address.
    #[must_use]
    pub fn with_type(mut self, address: u64, data_type: DataType) -> Self {
        self.types.insert(address, data_type);
        self
    }
}

impl HostMemory for MockHostMemory {
    fn read_unsigned(&self, address: u64, width: ReadWidth) -> Result<u64, OutOfBoundsRead> {
        let out_of_bounds = || OutOfBoundsRead { address, width };

        let start = address
            .checked_sub(self.base)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or_else(out_of_bounds)?;
        let end = start
            .checked_add(width.bytes() as usize)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(out_of_bounds)?;

        let mut value = 0u64;
        for (shift, byte) in self.bytes[start..end].iter().enumerate() {
            value |= u64::from(*byte) << (shift * 8);
        }
        Ok(value)
    }

    fn infer_type(&self, address: u64) -> DataType {
        self.types.get(&address).copied().unwrap_or(DataType::Unknown)
    }
}
