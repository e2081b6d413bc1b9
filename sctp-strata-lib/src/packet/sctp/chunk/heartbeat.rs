//! HEARTBEAT (type 4) and HEARTBEAT ACK (type 5) chunks
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 4    | Chunk  Flags  |      Heartbeat Length         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! \                                                               \
//! /            Heartbeat Information TLV (Variable-Length)        /
//! \                                                               \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The ACK echoes the sender-specific information unchanged, so both directions
//! share [`HeartbeatChunk`].

use std::fmt::{self, Formatter};
use std::ops::Deref;

use super::RawChunk;
use crate::packet::protocol::ParamType;
use crate::packet::sctp::param::{parse_params, SctpParamIter};

#[derive(Debug, Clone, Copy)]
pub struct HeartbeatChunk<'a> {
    raw: RawChunk<'a>,
    info: Option<&'a [u8]>,
    parsed: bool,
}

impl<'a> HeartbeatChunk<'a> {
    pub fn new(raw: RawChunk<'a>) -> Self {
        Self {
            raw,
            info: None,
            parsed: false,
        }
    }

    /// Lazy walk over the TLVs of the body
    #[inline]
    pub fn params(&self) -> SctpParamIter<'a> {
        parse_params(self.raw.body())
    }

    /// Picks up the heartbeat information parameter; the last one wins
    pub fn parse_chunk_data(&mut self) {
        if self.parsed {
            return;
        }
        for param in self.params() {
            if param.param_type() == ParamType::HEARTBEAT_INFO {
                self.info = Some(param.value());
            }
        }
        self.parsed = true;
    }

    #[inline]
    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// Sender-specific heartbeat information, `None` before parsing or if absent
    #[inline]
    pub fn info(&self) -> Option<&'a [u8]> {
        self.info
    }

    #[inline]
    pub fn info_len(&self) -> usize {
        self.info.map_or(0, <[u8]>::len)
    }
}

impl<'a> Deref for HeartbeatChunk<'a> {
    type Target = RawChunk<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl fmt::Display for HeartbeatChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} len={}", self.chunk_type(), self.length())?;
        if let Some(info) = self.info {
            write!(f, " info={}", info.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::sctp::chunk::tests::{chunk, decode};
    use crate::packet::sctp::chunk::Chunk;
    use crate::packet::sctp::param::tests::param;

    #[test]
    fn test_heartbeat_info_after_parse() {
        let bytes = chunk(0x04, 0, &param(1, b"ticket-42"));
        let Chunk::Heartbeat(mut hb) = decode(&bytes) else {
            panic!("expected HEARTBEAT")
        };

        assert!(!hb.is_parsed());
        assert_eq!(hb.info(), None);
        assert_eq!(hb.info_len(), 0);

        hb.parse_chunk_data();
        assert!(hb.is_parsed());
        assert_eq!(hb.info(), Some(&b"ticket-42"[..]));
        assert_eq!(hb.info_len(), 9);
        assert_eq!(hb.to_string(), "heartbeat len=20 info=9");
    }

    #[test]
    fn test_heartbeat_ack_shares_layout() {
        let mut body = param(1, &[1, 2, 3, 4]);
        body.extend_from_slice(&param(1, &[5, 6]));
        let bytes = chunk(0x05, 0, &body);

        let mut c = decode(&bytes);
        assert!(matches!(c, Chunk::HeartbeatAck(_)));
        c.parse_chunk_data();
        let Chunk::HeartbeatAck(ack) = c else {
            panic!("expected HEARTBEAT ACK")
        };
        assert_eq!(ack.info(), Some(&[5, 6][..]));
        assert_eq!(ack.params().count(), 2);
    }

    #[test]
    fn test_heartbeat_without_info() {
        let bytes = chunk(0x04, 0, &param(0x8001, &[0; 4]));
        let Chunk::Heartbeat(mut hb) = decode(&bytes) else {
            panic!("expected HEARTBEAT")
        };
        hb.parse_chunk_data();
        assert!(hb.is_parsed());
        assert_eq!(hb.info(), None);
    }
}
