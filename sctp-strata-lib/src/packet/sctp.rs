//! SCTP (Stream Control Transmission Protocol) packet layer
//!
//! This module decodes SCTP packets as defined in RFC 4960: the fixed common header
//! and the sequence of chunks that follows it. Decoding borrows the caller's buffer;
//! no byte is copied.
//!
//! # SCTP Common Header Format
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          Source Port          |       Destination Port        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      Verification Tag                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                       Checksum (CRC32c)                       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            Chunk #1                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                              ...                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            Chunk #n                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! # Key characteristics
//!
//! - Common header size: 12 bytes (fixed)
//! - Verification Tag: identifies the association
//! - Checksum: CRC32c algorithm (not Adler-32), never verified implicitly
//! - Everything after the common header is the chunk area; SCTP is the last
//!   layer decoded
//!
//! Malformed input does not make decoding fail once the common header is present:
//! the chunk walk stops at the first anomaly and reports it through
//! [`SctpLayer::status`].
//!
//! # Examples
//!
//! ```
//! use sctp_strata::packet::sctp::{SctpHeader, SctpLayer};
//! use sctp_strata::packet::sctp::chunk::Chunk;
//! use sctp_strata::packet::HeaderParser;
//!
//! let packet = vec![
//!     0x0B, 0x59, // Source port: 2905
//!     0x0B, 0x59, // Destination port: 2905
//!     0x12, 0x34, 0x56, 0x78, // Verification tag
//!     0x00, 0x00, 0x00, 0x00, // Checksum
//!     0x07, 0x00, 0x00, 0x08, // SHUTDOWN
//!     0x00, 0x00, 0x00, 0x2A, // cumulative TSN ack
//! ];
//!
//! let (layer, rest) = SctpHeader::from_bytes(&packet).unwrap();
//! assert!(rest.is_empty());
//! assert_eq!(layer.src_port(), 2905);
//! assert_eq!(layer.verification_tag(), 0x12345678);
//!
//! match layer.chunk(0) {
//!     Some(Chunk::Shutdown(shutdown)) => assert_eq!(shutdown.cumulative_tsn_ack(), 42),
//!     other => panic!("unexpected chunk {:?}", other),
//! }
//!
//! let layer = SctpLayer::new(&packet).unwrap();
//! assert_eq!(
//!     layer.to_string(),
//!     "SCTP Layer, Src port: 2905, Dst port: 2905, Verification Tag: 305419896, Chunks:  [ 7 , 8 , 8 ] "
//! );
//! ```

pub mod chunk;
pub mod param;

use std::fmt::{self, Formatter};
use std::mem;

use smallvec::SmallVec;
use tracing::debug;
use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::packet::{HeaderParser, PacketHeader, PacketHeaderError};

pub use self::chunk::{Chunk, ChunkAreaStatus, SctpChunkIter};

/// Chunks stored inline before the layer spills to the heap.
/// Most packets carry a single chunk; bundling rarely goes beyond a handful.
pub const MAX_INLINE_CHUNKS: usize = 4;

/// Size of the common header
pub const SCTP_HEADER_LEN: usize = mem::size_of::<SctpHeader>();

/// SCTP common header as defined in RFC 4960
///
/// The SCTP common header is 12 bytes and contains:
/// - Source port (16 bits)
/// - Destination port (16 bits)
/// - Verification tag (32 bits)
/// - Checksum (32 bits - CRC32c)
///
/// Following the common header, SCTP packets contain one or more chunks that carry
/// control information and user data.
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
pub struct SctpHeader {
    src_port: U16<BigEndian>,
    dst_port: U16<BigEndian>,
    verification_tag: U32<BigEndian>,
    checksum: U32<BigEndian>,
}

impl SctpHeader {
    /// Returns the source port number
    #[inline]
    pub fn src_port(&self) -> u16 {
        self.src_port.get()
    }

    /// Returns the destination port number
    #[inline]
    pub fn dst_port(&self) -> u16 {
        self.dst_port.get()
    }

    /// Returns the verification tag
    ///
    /// For packets carrying an INIT chunk this field is 0.
    #[inline]
    pub fn verification_tag(&self) -> u32 {
        self.verification_tag.get()
    }

    /// Returns the checksum field as it reads in network byte order
    #[inline]
    pub fn checksum(&self) -> u32 {
        self.checksum.get()
    }

    /// Returns the length of the SCTP header (always 12 bytes)
    #[inline]
    pub fn header_len(&self) -> usize {
        SCTP_HEADER_LEN
    }
}

impl PacketHeader for SctpHeader {
    const NAME: &'static str = "SctpHeader";

    type InnerType = ();

    #[inline]
    fn inner_type(&self) -> Self::InnerType {}

    /// The layer spans the whole buffer: the chunk area runs to its end
    #[inline]
    fn total_len(&self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl HeaderParser for SctpHeader {
    type Output<'a> = SctpLayer<'a>;

    #[inline]
    fn into_view<'a>(header: &'a Self, chunk_area: &'a [u8]) -> Self::Output<'a> {
        SctpLayer::from_parts(header, chunk_area)
    }
}

impl fmt::Display for SctpHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SCTP {} -> {} vtag=0x{:08x}",
            self.src_port(),
            self.dst_port(),
            self.verification_tag()
        )
    }
}

/// A decoded SCTP packet: the common header and its chunks, in wire order.
///
/// Chunks are built eagerly. The optional parameters of INIT, INIT ACK, HEARTBEAT,
/// HEARTBEAT ACK, ABORT and ERROR chunks are decoded on demand by
/// [`parse_chunk_data`](Self::parse_chunk_data).
#[derive(Debug, Clone)]
pub struct SctpLayer<'a> {
    header: &'a SctpHeader,
    chunk_area: &'a [u8],
    chunks: SmallVec<[Chunk<'a>; MAX_INLINE_CHUNKS]>,
    status: ChunkAreaStatus,
}

impl<'a> SctpLayer<'a> {
    /// Returns true if `buf` holds more than the common header.
    ///
    /// [`new`](Self::new) does not apply this check: a header-only packet decodes to
    /// a layer without chunks.
    #[inline]
    pub fn is_data_valid(buf: &[u8]) -> bool {
        buf.len() > SCTP_HEADER_LEN
    }

    /// Decodes `buf`, which starts at the SCTP common header and runs to the end
    /// of the transport payload.
    ///
    /// Fails only when the buffer is shorter than the common header.
    pub fn new(buf: &'a [u8]) -> Result<Self, PacketHeaderError> {
        SctpHeader::from_bytes(buf).map(|(layer, _)| layer)
    }

    fn from_parts(header: &'a SctpHeader, chunk_area: &'a [u8]) -> Self {
        let mut iter = SctpChunkIter::new(chunk_area);
        let chunks = iter.by_ref().map(Chunk::from_raw).collect();
        let status = iter.status();

        if !status.is_complete() {
            debug!(
                src_port = header.src_port(),
                dst_port = header.dst_port(),
                %status,
                "SCTP packet with malformed chunk area"
            );
        }

        Self {
            header,
            chunk_area,
            chunks,
            status,
        }
    }

    #[inline]
    pub fn header(&self) -> &'a SctpHeader {
        self.header
    }

    #[inline]
    pub fn src_port(&self) -> u16 {
        self.header.src_port()
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        self.header.dst_port()
    }

    #[inline]
    pub fn verification_tag(&self) -> u32 {
        self.header.verification_tag()
    }

    #[inline]
    pub fn checksum(&self) -> u32 {
        self.header.checksum()
    }

    #[inline]
    pub fn header_len(&self) -> usize {
        SCTP_HEADER_LEN
    }

    /// Bytes following the common header
    #[inline]
    pub fn chunk_area(&self) -> &'a [u8] {
        self.chunk_area
    }

    /// Decoded chunks in wire order; `chunks()[i].index() == i`
    #[inline]
    pub fn chunks(&self) -> &[Chunk<'a>] {
        &self.chunks
    }

    #[inline]
    pub fn chunks_mut(&mut self) -> &mut [Chunk<'a>] {
        &mut self.chunks
    }

    #[inline]
    pub fn chunk(&self, index: usize) -> Option<&Chunk<'a>> {
        self.chunks.get(index)
    }

    /// Number of decoded chunks
    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// How the chunk walk ended
    #[inline]
    pub fn status(&self) -> ChunkAreaStatus {
        self.status
    }

    /// Bytes of the chunk area that no decoded chunk covers
    #[inline]
    pub fn unparsed_len(&self) -> usize {
        self.status.unparsed_len()
    }

    /// Runs the deferred parameter decoding of every chunk. Idempotent.
    pub fn parse_chunk_data(&mut self) {
        for chunk in self.chunks.iter_mut() {
            chunk.parse_chunk_data();
        }
    }

    /// Diagnostic dump of the header fields and `[ type , size , padded ]` for
    /// every chunk.
    ///
    /// Unlike the `Display` impl, this runs [`parse_chunk_data`](Self::parse_chunk_data)
    /// first, so every chunk is fully decoded afterwards.
    pub fn render(&mut self) -> String {
        self.parse_chunk_data();
        self.to_string()
    }

    /// Checks the CRC32c of the packet against the header field
    pub fn verify_checksum(&self) -> bool {
        let header = self.header.as_bytes();
        let crc = crc32c_update(CRC32C_INIT, &header[..CHECKSUM_OFFSET]);
        let crc = crc32c_update(crc, &[0; 4]);
        let crc = crc32c_update(crc, self.chunk_area);
        finalize(crc) == self.checksum()
    }
}

impl fmt::Display for SctpLayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SCTP Layer, Src port: {}, Dst port: {}, Verification Tag: {}, Chunks: ",
            self.src_port(),
            self.dst_port(),
            self.verification_tag()
        )?;
        for chunk in &self.chunks {
            let code: u8 = chunk.chunk_type().into();
            write!(
                f,
                " [ {} , {} , {} ] ",
                code,
                chunk.length(),
                chunk.padded_length()
            )?;
        }
        Ok(())
    }
}

const CHECKSUM_OFFSET: usize = 8;
const CRC32C_INIT: u32 = 0xFFFF_FFFF;
// reflected Castagnoli polynomial
const CRC32C_POLY: u32 = 0x82F6_3B78;

static CRC32C_TABLE: [u32; 256] = crc32c_table();

const fn crc32c_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC32C_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

#[inline]
fn crc32c_update(crc: u32, data: &[u8]) -> u32 {
    data.iter().fold(crc, |crc, &byte| {
        CRC32C_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    })
}

// The CRC goes on the wire least significant byte first
#[inline]
fn finalize(crc: u32) -> u32 {
    (!crc).swap_bytes()
}

/// Computes the CRC32c of an SCTP packet (RFC 4960 appendix B), treating the
/// checksum field as zero.
///
/// The result compares directly with [`SctpHeader::checksum`]. Buffers shorter than
/// the common header are checksummed as they are.
pub fn compute_checksum(buf: &[u8]) -> u32 {
    let crc = if buf.len() >= SCTP_HEADER_LEN {
        let crc = crc32c_update(CRC32C_INIT, &buf[..CHECKSUM_OFFSET]);
        let crc = crc32c_update(crc, &[0; 4]);
        crc32c_update(crc, &buf[SCTP_HEADER_LEN..])
    } else {
        crc32c_update(CRC32C_INIT, buf)
    };
    finalize(crc)
}
