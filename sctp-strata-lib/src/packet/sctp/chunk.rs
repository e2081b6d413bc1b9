//! SCTP chunks
//!
//! Every chunk starts with a 4-byte common header:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |Act|  Type     |  Chunk  Flags  |        Chunk Length          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! \                                                               \
//! /                          Chunk Value                          /
//! \                                                               \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The length includes the header but not the trailing padding; the next chunk
//! starts at the length rounded up to a multiple of 4.
//!
//! [`SctpChunkIter`] walks the chunk area and yields [`RawChunk`] views, and
//! [`Chunk::from_raw`] turns each one into its typed variant. Variants carrying
//! optional parameters decode them only when [`Chunk::parse_chunk_data`] is called.
//!
//! # Examples
//!
//! ```
//! use sctp_strata::packet::sctp::chunk::{Chunk, SctpChunkIter};
//! use sctp_strata::packet::protocol::ChunkType;
//!
//! let area = [
//!     0x04, 0x00, 0x00, 0x0C, // HEARTBEAT, length 12
//!     0x00, 0x01, 0x00, 0x08, // heartbeat info parameter, length 8
//!     0xDE, 0xAD, 0xBE, 0xEF,
//!     0x0E, 0x01, 0x00, 0x04, // SHUTDOWN COMPLETE with the T bit
//! ];
//!
//! let mut chunks: Vec<Chunk> = SctpChunkIter::new(&area).map(Chunk::from_raw).collect();
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[1].chunk_type(), ChunkType::SHUTDOWN_COMPLETE);
//!
//! let Chunk::Heartbeat(hb) = &mut chunks[0] else { panic!("expected HEARTBEAT") };
//! assert_eq!(hb.info(), None);
//! hb.parse_chunk_data();
//! assert_eq!(hb.info(), Some(&[0xDE, 0xAD, 0xBE, 0xEF][..]));
//! ```

pub mod cause;
pub mod cookie;
pub mod data;
pub mod heartbeat;
pub mod init;
pub mod sack;
pub mod shutdown;

use std::fmt::{self, Formatter};
use std::iter::FusedIterator;

use tracing::debug;
use zerocopy::byteorder::{BigEndian, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Ref, Unaligned};

use crate::packet::protocol::ChunkType;
use crate::packet::sctp::param::padded_len;

pub use self::cause::{AbortChunk, ErrorChunk};
pub use self::cookie::CookieEchoChunk;
pub use self::data::DataChunk;
pub use self::heartbeat::HeartbeatChunk;
pub use self::init::{InitAckChunk, InitChunk};
pub use self::sack::SackChunk;
pub use self::shutdown::{ShutdownChunk, ShutdownCompleteChunk};

/// Size of the common chunk header
pub const CHUNK_HEADER_LEN: usize = 4;

/// Common chunk header
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
pub struct ChunkHeader {
    type_action: u8,
    flags: u8,
    length: U16<BigEndian>,
}

impl ChunkHeader {
    const TYPE_MASK: u8 = 0x3F;

    /// Returns the 6-bit chunk type
    #[inline]
    pub fn chunk_type(&self) -> ChunkType {
        ChunkType::from(self.type_action & Self::TYPE_MASK)
    }

    /// Returns the 2-bit action for receivers that do not recognize the type
    #[inline]
    pub fn action(&self) -> u8 {
        (self.type_action >> 6) & 0x03
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Returns the declared chunk length, header included, padding excluded
    #[inline]
    pub fn length(&self) -> u16 {
        self.length.get()
    }

    /// Returns the size the chunk occupies on the wire
    #[inline]
    pub fn padded_length(&self) -> usize {
        padded_len(self.length() as usize)
    }
}

/// The part shared by every chunk: header, body and position in the chunk area.
///
/// The `index` is the chunk's position in the owning layer's chunk list; it is the
/// only link back to the layer.
#[derive(Debug, Clone, Copy)]
pub struct RawChunk<'a> {
    header: &'a ChunkHeader,
    body: &'a [u8],
    index: usize,
}

impl<'a> RawChunk<'a> {
    #[inline]
    pub fn header(&self) -> &'a ChunkHeader {
        self.header
    }

    #[inline]
    pub fn chunk_type(&self) -> ChunkType {
        self.header.chunk_type()
    }

    #[inline]
    pub fn action(&self) -> u8 {
        self.header.action()
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.header.flags()
    }

    /// Declared length, header included
    #[inline]
    pub fn length(&self) -> usize {
        self.header.length() as usize
    }

    #[inline]
    pub fn padded_length(&self) -> usize {
        self.header.padded_length()
    }

    /// Bytes after the common header, bounded by the declared length and the buffer
    #[inline]
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Position in the owning layer's chunk list
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// True if the buffer ended before the declared chunk length
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.body.len() < self.length().saturating_sub(CHUNK_HEADER_LEN)
    }
}

impl fmt::Display for RawChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} len={}", self.chunk_type(), self.length())?;
        if self.flags() != 0 {
            write!(f, " flags=0x{:02x}", self.flags())?;
        }
        Ok(())
    }
}

/// How the walk over a chunk area ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkAreaStatus {
    /// Every byte belongs to a decoded chunk (a missing final pad is tolerated)
    #[default]
    Complete,
    /// Fewer than 4 bytes were left at `offset`, too few for a chunk header
    TrailingBytes { offset: usize, len: usize },
    /// The chunk at `offset` declared a length below the header size; the walk
    /// stopped there and `skipped` bytes were left undecoded
    BadChunkLength {
        offset: usize,
        length: u16,
        skipped: usize,
    },
    /// The last chunk, at `offset`, declared more bytes than `available`
    Truncated {
        offset: usize,
        declared: u16,
        available: usize,
    },
}

impl ChunkAreaStatus {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, ChunkAreaStatus::Complete)
    }

    /// Bytes of the chunk area that no decoded chunk covers
    #[inline]
    pub fn unparsed_len(&self) -> usize {
        match self {
            ChunkAreaStatus::Complete | ChunkAreaStatus::Truncated { .. } => 0,
            ChunkAreaStatus::TrailingBytes { len, .. } => *len,
            ChunkAreaStatus::BadChunkLength { skipped, .. } => *skipped,
        }
    }
}

impl fmt::Display for ChunkAreaStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ChunkAreaStatus::Complete => write!(f, "complete"),
            ChunkAreaStatus::TrailingBytes { offset, len } => {
                write!(f, "{} trailing bytes at {}", len, offset)
            }
            ChunkAreaStatus::BadChunkLength {
                offset,
                length,
                skipped,
            } => write!(
                f,
                "bad chunk length {} at {} ({} bytes skipped)",
                length, offset, skipped
            ),
            ChunkAreaStatus::Truncated {
                offset,
                declared,
                available,
            } => write!(
                f,
                "chunk at {} declares {} bytes, {} available",
                offset, declared, available
            ),
        }
    }
}

/// Walks a chunk area (the bytes after the common header), one chunk per step.
///
/// Offsets reported through [`status`](Self::status) are relative to the start of
/// the chunk area.
#[derive(Debug, Clone)]
pub struct SctpChunkIter<'a> {
    cursor: &'a [u8],
    offset: usize,
    index: usize,
    status: ChunkAreaStatus,
    done: bool,
}

impl<'a> SctpChunkIter<'a> {
    pub fn new(area: &'a [u8]) -> Self {
        Self {
            cursor: area,
            offset: 0,
            index: 0,
            status: ChunkAreaStatus::Complete,
            done: false,
        }
    }

    /// Outcome of the walk so far; final once the iterator returned `None`
    #[inline]
    pub fn status(&self) -> ChunkAreaStatus {
        self.status
    }

    fn finish(&mut self, status: ChunkAreaStatus) {
        if !status.is_complete() {
            debug!(%status, chunks = self.index, "SCTP chunk area ended early");
        }
        self.status = status;
        self.done = true;
        self.cursor = &[];
    }
}

impl<'a> Iterator for SctpChunkIter<'a> {
    type Item = RawChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.cursor.is_empty() {
            self.finish(ChunkAreaStatus::Complete);
            return None;
        }

        let available = self.cursor.len();
        let Ok((header, rest)) = Ref::<_, ChunkHeader>::from_prefix(self.cursor) else {
            self.finish(ChunkAreaStatus::TrailingBytes {
                offset: self.offset,
                len: available,
            });
            return None;
        };
        let header = Ref::into_ref(header);

        let declared = header.length();
        if (declared as usize) < CHUNK_HEADER_LEN {
            self.finish(ChunkAreaStatus::BadChunkLength {
                offset: self.offset,
                length: declared,
                skipped: available,
            });
            return None;
        }

        let body_len = declared as usize - CHUNK_HEADER_LEN;
        let chunk = RawChunk {
            header,
            body: &rest[..body_len.min(rest.len())],
            index: self.index,
        };
        self.index += 1;

        if body_len > rest.len() {
            self.finish(ChunkAreaStatus::Truncated {
                offset: self.offset,
                declared,
                available,
            });
        } else {
            let advance = header.padded_length().min(available);
            self.cursor = &self.cursor[advance..];
            self.offset += advance;
        }

        Some(chunk)
    }
}

impl FusedIterator for SctpChunkIter<'_> {}

/// A decoded chunk.
///
/// HEARTBEAT ACK shares the HEARTBEAT representation. Types without dedicated
/// support (ECNE, CWR, AUTH, extensions) and known types whose fixed fields do not
/// fit in the body are kept as [`Chunk::Generic`].
#[derive(Debug, Clone)]
pub enum Chunk<'a> {
    Data(DataChunk<'a>),
    Init(InitChunk<'a>),
    InitAck(InitAckChunk<'a>),
    Sack(SackChunk<'a>),
    Heartbeat(HeartbeatChunk<'a>),
    HeartbeatAck(HeartbeatChunk<'a>),
    Abort(AbortChunk<'a>),
    Shutdown(ShutdownChunk<'a>),
    ShutdownAck(RawChunk<'a>),
    Error(ErrorChunk<'a>),
    CookieEcho(CookieEchoChunk<'a>),
    CookieAck(RawChunk<'a>),
    ShutdownComplete(ShutdownCompleteChunk<'a>),
    Generic(RawChunk<'a>),
}

impl<'a> Chunk<'a> {
    /// Dispatches on the chunk type and builds the matching variant
    pub fn from_raw(raw: RawChunk<'a>) -> Self {
        let chunk = match raw.chunk_type() {
            ChunkType::DATA => DataChunk::new(raw).map(Chunk::Data),
            ChunkType::INIT => InitChunk::new(raw).map(Chunk::Init),
            ChunkType::INIT_ACK => InitAckChunk::new(raw).map(Chunk::InitAck),
            ChunkType::SACK => SackChunk::new(raw).map(Chunk::Sack),
            ChunkType::HEARTBEAT => Some(Chunk::Heartbeat(HeartbeatChunk::new(raw))),
            ChunkType::HEARTBEAT_ACK => Some(Chunk::HeartbeatAck(HeartbeatChunk::new(raw))),
            ChunkType::ABORT => Some(Chunk::Abort(AbortChunk::new(raw))),
            ChunkType::SHUTDOWN => ShutdownChunk::new(raw).map(Chunk::Shutdown),
            ChunkType::SHUTDOWN_ACK => Some(Chunk::ShutdownAck(raw)),
            ChunkType::ERROR => Some(Chunk::Error(ErrorChunk::new(raw))),
            ChunkType::COOKIE_ECHO => Some(Chunk::CookieEcho(CookieEchoChunk::new(raw))),
            ChunkType::COOKIE_ACK => Some(Chunk::CookieAck(raw)),
            ChunkType::SHUTDOWN_COMPLETE => {
                Some(Chunk::ShutdownComplete(ShutdownCompleteChunk::new(raw)))
            }
            _ => Some(Chunk::Generic(raw)),
        };

        chunk.unwrap_or_else(|| {
            debug!(
                chunk_type = %raw.chunk_type(),
                body_len = raw.body().len(),
                "SCTP chunk body too short for its fixed fields"
            );
            Chunk::Generic(raw)
        })
    }

    /// Returns the header/body view shared by all variants
    pub fn raw(&self) -> &RawChunk<'a> {
        match self {
            Chunk::Data(c) => c,
            Chunk::Init(c) => c,
            Chunk::InitAck(c) => c,
            Chunk::Sack(c) => c,
            Chunk::Heartbeat(c) | Chunk::HeartbeatAck(c) => c,
            Chunk::Abort(c) => c,
            Chunk::Shutdown(c) => c,
            Chunk::Error(c) => c,
            Chunk::CookieEcho(c) => c,
            Chunk::ShutdownComplete(c) => c,
            Chunk::ShutdownAck(c) | Chunk::CookieAck(c) | Chunk::Generic(c) => c,
        }
    }

    #[inline]
    pub fn chunk_type(&self) -> ChunkType {
        self.raw().chunk_type()
    }

    #[inline]
    pub fn action(&self) -> u8 {
        self.raw().action()
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.raw().flags()
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.raw().length()
    }

    #[inline]
    pub fn padded_length(&self) -> usize {
        self.raw().padded_length()
    }

    #[inline]
    pub fn body(&self) -> &'a [u8] {
        self.raw().body()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.raw().index()
    }

    /// Decodes the optional parameters of INIT, INIT ACK, HEARTBEAT, HEARTBEAT ACK,
    /// ABORT and ERROR chunks. Does nothing for the other variants. Idempotent.
    pub fn parse_chunk_data(&mut self) {
        match self {
            Chunk::Init(c) => c.parse_chunk_data(),
            Chunk::InitAck(c) => c.parse_chunk_data(),
            Chunk::Heartbeat(c) | Chunk::HeartbeatAck(c) => c.parse_chunk_data(),
            Chunk::Abort(c) => c.parse_chunk_data(),
            Chunk::Error(c) => c.parse_chunk_data(),
            _ => {}
        }
    }

    /// False while a deferred parse is still pending
    pub fn is_parsed(&self) -> bool {
        match self {
            Chunk::Init(c) => c.is_parsed(),
            Chunk::InitAck(c) => c.is_parsed(),
            Chunk::Heartbeat(c) | Chunk::HeartbeatAck(c) => c.is_parsed(),
            Chunk::Abort(c) => c.is_parsed(),
            Chunk::Error(c) => c.is_parsed(),
            _ => true,
        }
    }
}

impl fmt::Display for Chunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Chunk::Data(c) => write!(f, "{}", c),
            Chunk::Init(c) => write!(f, "{}", c),
            Chunk::InitAck(c) => write!(f, "{}", c),
            Chunk::Sack(c) => write!(f, "{}", c),
            Chunk::Heartbeat(c) | Chunk::HeartbeatAck(c) => write!(f, "{}", c),
            Chunk::Abort(c) => write!(f, "{}", c),
            Chunk::Shutdown(c) => write!(f, "{}", c),
            Chunk::Error(c) => write!(f, "{}", c),
            Chunk::CookieEcho(c) => write!(f, "{}", c),
            Chunk::ShutdownComplete(c) => write!(f, "{}", c),
            Chunk::ShutdownAck(c) | Chunk::CookieAck(c) | Chunk::Generic(c) => {
                write!(f, "{}", c)
            }
        }
    }
}
