//! SCTP code points
//!
//! Chunk types, parameter types and error cause codes as registered by IANA for
//! RFC 4960 (and the extensions whose codes show up in ordinary captures).
//!
//! # Examples
//!
//! ```
//! use sctp_strata::packet::protocol::{ChunkType, ErrorCause, ParamType};
//!
//! assert_eq!(format!("{}", ChunkType::INIT_ACK), "init-ack");
//! assert_eq!(format!("{}", ChunkType::from(63)), "0x3f");
//!
//! let value: u16 = ParamType::STATE_COOKIE.into();
//! assert_eq!(value, 7);
//! assert_eq!(ErrorCause::from(12), ErrorCause::USER_INITIATED_ABORT);
//!
//! assert!(ChunkType::SACK.is_known());
//! assert!(!ChunkType::from(40).is_known());
//! ```

use zerocopy::{BigEndian, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, U16};

crate::protocol_constants! {
    /// The 6-bit chunk type (the two action bits are stripped before conversion).
    ChunkType, u8, u8:
        #[default] DATA = 0;
        INIT = 1;
        INIT_ACK = 2;
        SACK = 3;
        HEARTBEAT = 4;
        HEARTBEAT_ACK = 5;
        ABORT = 6;
        SHUTDOWN = 7;
        SHUTDOWN_ACK = 8;
        ERROR = 9;
        COOKIE_ECHO = 10;
        COOKIE_ACK = 11;
        ECNE = 12;
        CWR = 13;
        SHUTDOWN_COMPLETE = 14;
        AUTH = 15;
}

crate::protocol_constants! {
    /// Type of an optional/variable-length parameter (TLV) inside a chunk.
    ParamType, U16<BigEndian>, u16:
        HEARTBEAT_INFO = 1;
        IPV4_ADDRESS = 5;
        IPV6_ADDRESS = 6;
        STATE_COOKIE = 7;
        UNRECOGNIZED_PARAMETER = 8;
        COOKIE_PRESERVATIVE = 9;
        HOST_NAME_ADDRESS = 11;
        SUPPORTED_ADDRESS_TYPES = 12;
        ECN_CAPABLE = 0x8000;
        FORWARD_TSN_SUPPORTED = 0xC000;
}

crate::protocol_constants! {
    /// Cause code of an error cause TLV carried by ABORT and ERROR chunks.
    ErrorCause, U16<BigEndian>, u16:
        INVALID_STREAM_IDENTIFIER = 1;
        MISSING_MANDATORY_PARAMETER = 2;
        STALE_COOKIE = 3;
        OUT_OF_RESOURCE = 4;
        UNRESOLVABLE_ADDRESS = 5;
        UNRECOGNIZED_CHUNK_TYPE = 6;
        INVALID_MANDATORY_PARAMETER = 7;
        UNRECOGNIZED_PARAMETERS = 8;
        NO_USER_DATA = 9;
        COOKIE_WHILE_SHUTTING_DOWN = 10;
        RESTART_WITH_NEW_ADDRESSES = 11;
        USER_INITIATED_ABORT = 12;
        PROTOCOL_VIOLATION = 13;
}
