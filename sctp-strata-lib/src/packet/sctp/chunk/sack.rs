//! SACK chunk (type 3)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 3    |Chunk  Flags   |      Chunk Length             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      Cumulative TSN Ack                       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          Advertised Receiver Window Credit (a_rwnd)           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | Number of Gap Ack Blocks = N  |  Number of Duplicate TSNs = X |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Gap Ack Block #1 Start       |   Gap Ack Block #1 End        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /                                                               /
//! \                              ...                              \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                       Duplicate TSN 1                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /                                                               /
//! \                              ...                              \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The duplicate TSN list starts right after the N declared gap blocks. Entries the
//! chunk body does not actually contain read as 0.

use std::fmt::{self, Formatter};
use std::ops::Deref;

use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Ref, Unaligned};

use super::RawChunk;

/// Fixed part of the SACK chunk body
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
pub struct SackHeader {
    cumulative_tsn_ack: U32<BigEndian>,
    a_rwnd: U32<BigEndian>,
    gap_blocks: U16<BigEndian>,
    dup_tsns: U16<BigEndian>,
}

/// Gap ack block, offsets relative to the cumulative TSN ack
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
pub struct GapAckBlock {
    start: U16<BigEndian>,
    end: U16<BigEndian>,
}

impl GapAckBlock {
    #[inline]
    pub fn start(&self) -> u16 {
        self.start.get()
    }

    #[inline]
    pub fn end(&self) -> u16 {
        self.end.get()
    }
}

const GAP_BLOCK_LEN: usize = 4;
const DUP_TSN_LEN: usize = 4;

// Casts the whole entries available in `bytes`, at most `count` of them
fn cast_entries<T>(bytes: &[u8], count: usize, entry_len: usize) -> &[T]
where
    T: FromBytes + KnownLayout + Immutable + Unaligned,
{
    let n = count.min(bytes.len() / entry_len);
    Ref::<_, [T]>::from_bytes(&bytes[..n * entry_len])
        .map(Ref::into_ref)
        .unwrap_or(&[])
}

#[derive(Debug, Clone, Copy)]
pub struct SackChunk<'a> {
    raw: RawChunk<'a>,
    header: &'a SackHeader,
    gap_blocks: &'a [GapAckBlock],
    dup_tsns: &'a [U32<BigEndian>],
}

impl<'a> SackChunk<'a> {
    /// Returns `None` if the body cannot hold the 12-byte fixed part
    pub fn new(raw: RawChunk<'a>) -> Option<Self> {
        let (header, rest) = Ref::<_, SackHeader>::from_prefix(raw.body()).ok()?;
        let header = Ref::into_ref(header);

        let declared_gaps = header.gap_blocks.get() as usize;
        let gap_blocks = cast_entries(rest, declared_gaps, GAP_BLOCK_LEN);
        let dup_area = rest.get(declared_gaps * GAP_BLOCK_LEN..).unwrap_or(&[]);
        let dup_tsns = cast_entries(dup_area, header.dup_tsns.get() as usize, DUP_TSN_LEN);

        Some(Self {
            raw,
            header,
            gap_blocks,
            dup_tsns,
        })
    }

    #[inline]
    pub fn sack_header(&self) -> &'a SackHeader {
        self.header
    }

    #[inline]
    pub fn cumulative_tsn_ack(&self) -> u32 {
        self.header.cumulative_tsn_ack.get()
    }

    #[inline]
    pub fn a_rwnd(&self) -> u32 {
        self.header.a_rwnd.get()
    }

    /// Number of gap ack blocks as declared in the header
    #[inline]
    pub fn gap_block_count(&self) -> u16 {
        self.header.gap_blocks.get()
    }

    /// Number of duplicate TSNs as declared in the header
    #[inline]
    pub fn duplicate_tsn_count(&self) -> u16 {
        self.header.dup_tsns.get()
    }

    pub fn gap_start(&self, index: usize) -> u16 {
        self.gap_blocks.get(index).map_or(0, GapAckBlock::start)
    }

    pub fn gap_end(&self, index: usize) -> u16 {
        self.gap_blocks.get(index).map_or(0, GapAckBlock::end)
    }

    pub fn dup_tsn(&self, index: usize) -> u32 {
        self.dup_tsns.get(index).map_or(0, |tsn| tsn.get())
    }

    /// Gap ack blocks present in the body
    pub fn gap_blocks(&self) -> std::slice::Iter<'a, GapAckBlock> {
        self.gap_blocks.iter()
    }

    /// Duplicate TSNs present in the body
    pub fn dup_tsns(&self) -> impl ExactSizeIterator<Item = u32> + 'a {
        self.dup_tsns.iter().map(|tsn| tsn.get())
    }
}

impl<'a> Deref for SackChunk<'a> {
    type Target = RawChunk<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl fmt::Display for SackChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sack cum_tsn={} a_rwnd={}",
            self.cumulative_tsn_ack(),
            self.a_rwnd()
        )?;
        if !self.gap_blocks.is_empty() {
            write!(f, " gaps=")?;
            for (i, block) in self.gap_blocks.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}-{}", block.start(), block.end())?;
            }
        }
        if !self.dup_tsns.is_empty() {
            write!(f, " dups={}", self.dup_tsns.len())?;
        }
        Ok(())
    }
}
