//! DATA chunk (type 0)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 0    | Res |I|U|B|E|            Length             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                              TSN                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      Stream Identifier S      |   Stream Sequence Number n    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                  Payload Protocol Identifier                  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! \                                                               \
//! /                 User Data (seq n of Stream S)                 /
//! \                                                               \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::fmt::{self, Formatter};
use std::ops::Deref;

use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Ref, Unaligned};

use super::RawChunk;

/// Fixed part of the DATA chunk body
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
pub struct DataHeader {
    tsn: U32<BigEndian>,
    stream_id: U16<BigEndian>,
    stream_seq: U16<BigEndian>,
    ppid: U32<BigEndian>,
}

#[derive(Debug, Clone, Copy)]
pub struct DataChunk<'a> {
    raw: RawChunk<'a>,
    header: &'a DataHeader,
    payload: &'a [u8],
}

impl<'a> DataChunk<'a> {
    pub const FLAG_END: u8 = 0x01;
    pub const FLAG_BEGIN: u8 = 0x02;
    pub const FLAG_UNORDERED: u8 = 0x04;
    pub const FLAG_IMMEDIATE: u8 = 0x08;

    /// Returns `None` if the body cannot hold the 12-byte fixed part
    pub fn new(raw: RawChunk<'a>) -> Option<Self> {
        let (header, payload) = Ref::<_, DataHeader>::from_prefix(raw.body()).ok()?;
        Some(Self {
            raw,
            header: Ref::into_ref(header),
            payload,
        })
    }

    #[inline]
    pub fn data_header(&self) -> &'a DataHeader {
        self.header
    }

    #[inline]
    pub fn tsn(&self) -> u32 {
        self.header.tsn.get()
    }

    #[inline]
    pub fn stream_id(&self) -> u16 {
        self.header.stream_id.get()
    }

    #[inline]
    pub fn stream_seq(&self) -> u16 {
        self.header.stream_seq.get()
    }

    /// Payload protocol identifier
    #[inline]
    pub fn ppid(&self) -> u32 {
        self.header.ppid.get()
    }

    /// User data after the fixed part; empty when the chunk carries none
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    #[inline]
    pub fn is_begin_fragment(&self) -> bool {
        self.flags() & Self::FLAG_BEGIN != 0
    }

    #[inline]
    pub fn is_end_fragment(&self) -> bool {
        self.flags() & Self::FLAG_END != 0
    }

    #[inline]
    pub fn is_unordered(&self) -> bool {
        self.flags() & Self::FLAG_UNORDERED != 0
    }

    /// I bit: the receiver should SACK this chunk immediately (RFC 7053)
    #[inline]
    pub fn is_immediate(&self) -> bool {
        self.flags() & Self::FLAG_IMMEDIATE != 0
    }

    /// First fragment of a fragmented user message
    #[inline]
    pub fn is_first_fragment(&self) -> bool {
        self.is_begin_fragment() && !self.is_end_fragment()
    }

    /// Middle fragment
    #[inline]
    pub fn is_part_of_fragment(&self) -> bool {
        !self.is_begin_fragment() && !self.is_end_fragment()
    }

    /// Last fragment
    #[inline]
    pub fn is_last_fragment(&self) -> bool {
        !self.is_begin_fragment() && self.is_end_fragment()
    }

    /// Whole message in one chunk
    #[inline]
    pub fn is_unfragmented(&self) -> bool {
        self.is_begin_fragment() && self.is_end_fragment()
    }
}

impl<'a> Deref for DataChunk<'a> {
    type Target = RawChunk<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl fmt::Display for DataChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let fragment = if self.is_unfragmented() {
            "whole"
        } else if self.is_first_fragment() {
            "first"
        } else if self.is_last_fragment() {
            "last"
        } else {
            "middle"
        };

        write!(
            f,
            "data tsn={} sid={} ssn={} ppid={} {} payload={}",
            self.tsn(),
            self.stream_id(),
            self.stream_seq(),
            self.ppid(),
            fragment,
            self.payload.len()
        )?;
        if self.is_unordered() {
            write!(f, " unordered")?;
        }
        if self.is_immediate() {
            write!(f, " immediate")?;
        }
        Ok(())
    }
}
