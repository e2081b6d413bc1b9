//! COOKIE ECHO chunk (type 10)
//!
//! The body is the state cookie received in the INIT ACK, echoed back unchanged.

use std::fmt::{self, Formatter};
use std::ops::Deref;

use super::RawChunk;

#[derive(Debug, Clone, Copy)]
pub struct CookieEchoChunk<'a> {
    raw: RawChunk<'a>,
}

impl<'a> CookieEchoChunk<'a> {
    pub fn new(raw: RawChunk<'a>) -> Self {
        Self { raw }
    }

    /// The opaque cookie: the whole chunk body
    #[inline]
    pub fn cookie(&self) -> &'a [u8] {
        self.raw.body()
    }

    #[inline]
    pub fn cookie_len(&self) -> usize {
        self.raw.body().len()
    }
}

impl<'a> Deref for CookieEchoChunk<'a> {
    type Target = RawChunk<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl fmt::Display for CookieEchoChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "cookie-echo cookie={}", self.cookie_len())
    }
}

#[cfg(test)]
mod tests {
    use crate::packet::sctp::chunk::tests::{chunk, decode};
    use crate::packet::sctp::chunk::Chunk;

    #[test]
    fn test_cookie_is_whole_body() {
        let bytes = chunk(0x0A, 0, b"opaque-state");
        let Chunk::CookieEcho(echo) = decode(&bytes) else {
            panic!("expected COOKIE ECHO")
        };
        assert_eq!(echo.cookie(), b"opaque-state");
        assert_eq!(echo.cookie_len(), 12);
        assert_eq!(echo.to_string(), "cookie-echo cookie=12");
    }

    #[test]
    fn test_empty_cookie() {
        let bytes = chunk(0x0A, 0, &[]);
        let Chunk::CookieEcho(echo) = decode(&bytes) else {
            panic!("expected COOKIE ECHO")
        };
        assert!(echo.cookie().is_empty());
    }
}
