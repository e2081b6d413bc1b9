//! ABORT (type 6) and ERROR (type 9) chunks
//!
//! Both carry zero or more error causes, encoded like parameters with the cause
//! code in place of the parameter type:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 6    |Reserved     |T|           Length              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! \                                                               \
//! /                   zero or more Error Causes                   /
//! \                                                               \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::fmt::{self, Formatter};
use std::ops::Deref;

use super::RawChunk;
use crate::packet::sctp::param::{parse_params, SctpParam, SctpParamIter};

const FLAG_T: u8 = 0x01;

macro_rules! cause_chunk {
    ($(#[$doc:meta])* $chunk:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $chunk<'a> {
            raw: RawChunk<'a>,
            causes: Option<Vec<SctpParam<'a>>>,
        }

        impl<'a> $chunk<'a> {
            pub fn new(raw: RawChunk<'a>) -> Self {
                Self { raw, causes: None }
            }

            /// Lazy walk over the error causes of the body
            #[inline]
            pub fn params(&self) -> SctpParamIter<'a> {
                parse_params(self.raw.body())
            }

            /// Collects every error cause of the body
            pub fn parse_chunk_data(&mut self) {
                if self.causes.is_none() {
                    self.causes = Some(self.params().collect());
                }
            }

            #[inline]
            pub fn is_parsed(&self) -> bool {
                self.causes.is_some()
            }

            /// Error causes in wire order, empty before parsing
            pub fn error_causes(&self) -> &[SctpParam<'a>] {
                self.causes.as_deref().unwrap_or(&[])
            }
        }

        impl<'a> Deref for $chunk<'a> {
            type Target = RawChunk<'a>;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.raw
            }
        }

        impl fmt::Display for $chunk<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{} len={}", self.chunk_type(), self.length())?;
                if self.flags() & FLAG_T != 0 {
                    write!(f, " T")?;
                }
                for (i, cause) in self.error_causes().iter().enumerate() {
                    let sep = if i == 0 { " causes=" } else { "," };
                    write!(f, "{}{}", sep, cause.cause())?;
                }
                Ok(())
            }
        }
    };
}

cause_chunk!(
    /// ABORT chunk
    AbortChunk
);

cause_chunk!(
    /// ERROR chunk
    ErrorChunk
);

impl AbortChunk<'_> {
    /// T bit: the verification tag is the one the receiver expects of the sender
    #[inline]
    pub fn has_reflected_tag(&self) -> bool {
        self.flags() & FLAG_T != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::protocol::ErrorCause;
    use crate::packet::sctp::chunk::tests::{chunk, decode};
    use crate::packet::sctp::chunk::Chunk;
    use crate::packet::sctp::param::tests::param;

    #[test]
    fn test_abort_causes() {
        let mut body = param(12, b"bye");
        body.extend_from_slice(&param(1, &[0x00, 0x07, 0x00, 0x00]));
        let bytes = chunk(0x06, 0x01, &body);

        let Chunk::Abort(mut abort) = decode(&bytes) else {
            panic!("expected ABORT")
        };
        assert!(abort.has_reflected_tag());
        assert!(abort.error_causes().is_empty());

        abort.parse_chunk_data();
        let causes = abort.error_causes();
        assert_eq!(causes.len(), 2);
        assert_eq!(causes[0].cause(), ErrorCause::USER_INITIATED_ABORT);
        assert_eq!(causes[0].value(), b"bye");
        assert_eq!(causes[1].cause(), ErrorCause::INVALID_STREAM_IDENTIFIER);
        assert_eq!(
            abort.to_string(),
            "abort len=20 T causes=user-initiated-abort,invalid-stream-identifier"
        );
    }

    #[test]
    fn test_abort_without_t_bit() {
        let bytes = chunk(0x06, 0x00, &[]);
        let Chunk::Abort(mut abort) = decode(&bytes) else {
            panic!("expected ABORT")
        };
        assert!(!abort.has_reflected_tag());
        abort.parse_chunk_data();
        assert!(abort.is_parsed());
        assert!(abort.error_causes().is_empty());
    }

    #[test]
    fn test_error_chunk_causes() {
        let bytes = chunk(0x09, 0, &param(3, &[0, 0, 0x27, 0x10]));
        let mut c = decode(&bytes);
        assert!(matches!(c, Chunk::Error(_)));
        assert!(!c.is_parsed());

        c.parse_chunk_data();
        let Chunk::Error(err) = &c else {
            panic!("expected ERROR")
        };
        assert_eq!(err.error_causes().len(), 1);
        assert_eq!(err.error_causes()[0].cause(), ErrorCause::STALE_COOKIE);
        assert_eq!(err.params().count(), 1);
    }
}
