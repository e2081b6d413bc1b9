//! Zero-copy SCTP packet-layer decoding.
//!
//! `sctp_strata` turns the bytes of an SCTP segment (RFC 4960) into a navigable view:
//! the 12-byte common header, the ordered list of chunks that follows it and, on demand,
//! the TLV parameters carried inside INIT, INIT ACK, HEARTBEAT, ABORT and ERROR chunks.
//!
//! Nothing is copied out of the caller's buffer except values that have to outlive a
//! single decode pass (addresses, host names, numeric fields). Chunk bodies, cookies,
//! heartbeat info and user payloads stay borrowed.
//!
//! ```
//! use sctp_strata::packet::sctp::SctpLayer;
//! use sctp_strata::packet::sctp::chunk::Chunk;
//!
//! let segment = [
//!     0x0B, 0x59, 0x0B, 0x59, // ports 2905 -> 2905
//!     0x00, 0x00, 0x00, 0x01, // verification tag
//!     0x00, 0x00, 0x00, 0x00, // checksum
//!     0x0B, 0x00, 0x00, 0x04, // COOKIE ACK
//! ];
//!
//! let layer = SctpLayer::new(&segment).unwrap();
//! assert_eq!(layer.src_port(), 2905);
//! assert_eq!(layer.chunks().len(), 1);
//! assert!(matches!(layer.chunks()[0], Chunk::CookieAck(_)));
//! ```

pub mod macros;
pub mod packet;
