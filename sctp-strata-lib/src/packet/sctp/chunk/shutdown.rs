//! SHUTDOWN (type 7) and SHUTDOWN COMPLETE (type 14) chunks
//!
//! SHUTDOWN carries the cumulative TSN ack, SHUTDOWN COMPLETE only the T bit:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 7    | Chunk  Flags  |      Length = 8               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      Cumulative TSN Ack                       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 14   |Reserved     |T|      Length = 4               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::fmt::{self, Formatter};
use std::ops::Deref;

use zerocopy::byteorder::{BigEndian, U32};
use zerocopy::Ref;

use super::RawChunk;

#[derive(Debug, Clone, Copy)]
pub struct ShutdownChunk<'a> {
    raw: RawChunk<'a>,
    cumulative_tsn_ack: &'a U32<BigEndian>,
}

impl<'a> ShutdownChunk<'a> {
    /// Returns `None` if the body is shorter than 4 bytes
    pub fn new(raw: RawChunk<'a>) -> Option<Self> {
        let (tsn, _) = Ref::<_, U32<BigEndian>>::from_prefix(raw.body()).ok()?;
        Some(Self {
            raw,
            cumulative_tsn_ack: Ref::into_ref(tsn),
        })
    }

    #[inline]
    pub fn cumulative_tsn_ack(&self) -> u32 {
        self.cumulative_tsn_ack.get()
    }
}

impl<'a> Deref for ShutdownChunk<'a> {
    type Target = RawChunk<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl fmt::Display for ShutdownChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "shutdown cum_tsn={}", self.cumulative_tsn_ack())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShutdownCompleteChunk<'a> {
    raw: RawChunk<'a>,
}

impl<'a> ShutdownCompleteChunk<'a> {
    const FLAG_T: u8 = 0x01;

    pub fn new(raw: RawChunk<'a>) -> Self {
        Self { raw }
    }

    /// T bit: the verification tag is the one the receiver expects of the sender
    #[inline]
    pub fn has_reflected_tag(&self) -> bool {
        self.flags() & Self::FLAG_T != 0
    }
}

impl<'a> Deref for ShutdownCompleteChunk<'a> {
    type Target = RawChunk<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl fmt::Display for ShutdownCompleteChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "shutdown-complete")?;
        if self.has_reflected_tag() {
            write!(f, " T")?;
        }
        Ok(())
    }
}
