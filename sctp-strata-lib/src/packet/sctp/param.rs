//! SCTP chunk parameters (type-length-value records)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          Parameter Type       |       Parameter Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! \                                                               \
//! /                       Parameter Value                         /
//! \                                                               \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The length covers the 4-byte header and the value but not the padding that
//! aligns the next record to a 4-byte boundary. Error causes (ABORT, ERROR) use the
//! same layout with a cause code in place of the parameter type.

use std::fmt::{self, Formatter};
use std::iter::FusedIterator;

use zerocopy::byteorder::{BigEndian, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Ref, Unaligned};

use crate::packet::protocol::{ErrorCause, ParamType};

/// Size of the type + length header of a parameter
pub const PARAM_HEADER_LEN: usize = 4;

/// Rounds a declared length up to the next multiple of 4
#[inline]
pub const fn padded_len(len: usize) -> usize {
    len + ((4 - len % 4) % 4)
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
pub struct ParamHeader {
    param_type: ParamType,
    length: U16<BigEndian>,
}

impl ParamHeader {
    #[inline]
    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    #[inline]
    pub fn length(&self) -> u16 {
        self.length.get()
    }
}

/// A single TLV record borrowed from a chunk body
#[derive(Debug, Clone, Copy)]
pub struct SctpParam<'a> {
    header: &'a ParamHeader,
    value: &'a [u8],
}

impl<'a> SctpParam<'a> {
    /// Returns the parameter type
    #[inline]
    pub fn param_type(&self) -> ParamType {
        self.header.param_type()
    }

    /// Returns the type field read as an error cause code
    #[inline]
    pub fn cause(&self) -> ErrorCause {
        let code: u16 = self.header.param_type().into();
        ErrorCause::from(code)
    }

    /// Returns the declared length, header included
    #[inline]
    pub fn length(&self) -> usize {
        self.header.length() as usize
    }

    /// Returns the size the record occupies on the wire (4-byte aligned)
    #[inline]
    pub fn padded_length(&self) -> usize {
        padded_len(self.length())
    }

    /// Returns the declared value size (length minus header)
    #[inline]
    pub fn data_len(&self) -> usize {
        self.length().saturating_sub(PARAM_HEADER_LEN)
    }

    /// Returns the value bytes present in the buffer
    ///
    /// Shorter than [`data_len`](Self::data_len) only when the record was cut off
    /// by the end of the enclosing buffer.
    #[inline]
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// True if the buffer ended before the declared value did
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.value.len() < self.data_len()
    }
}

impl fmt::Display for SctpParam<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.param_type(), self.data_len())
    }
}

/// Lazily walks a parameter area, yielding records in wire order.
///
/// The walk stops without error when fewer than four bytes remain. A record whose
/// declared length is smaller than its own header is yielded once with an empty
/// value and ends the walk, since no next offset can be derived from it. A record
/// that runs past the end of the buffer is yielded with its value clamped.
///
/// The iterator is `Clone`, so a parameter area can be walked any number of times.
#[derive(Debug, Clone)]
pub struct SctpParamIter<'a> {
    cursor: &'a [u8],
    done: bool,
}

impl<'a> SctpParamIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: data,
            done: false,
        }
    }

    /// Number of bytes not covered by the records yielded so far
    #[inline]
    pub fn remaining(&self) -> usize {
        self.cursor.len()
    }
}

/// Returns the parameters found in `data`
#[inline]
pub fn parse_params(data: &[u8]) -> SctpParamIter<'_> {
    SctpParamIter::new(data)
}

impl<'a> Iterator for SctpParamIter<'a> {
    type Item = SctpParam<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Ok((header, rest)) = Ref::<_, ParamHeader>::from_prefix(self.cursor) else {
            self.done = true;
            return None;
        };
        let header = Ref::into_ref(header);
        let declared = header.length() as usize;

        if declared < PARAM_HEADER_LEN {
            self.done = true;
            return Some(SctpParam { header, value: &[] });
        }

        let value_len = (declared - PARAM_HEADER_LEN).min(rest.len());
        let value = &rest[..value_len];

        let advance = padded_len(declared);
        if advance < self.cursor.len() {
            self.cursor = &self.cursor[advance..];
        } else {
            if declared > self.cursor.len() {
                self.done = true;
            }
            self.cursor = &[];
        }

        Some(SctpParam { header, value })
    }
}

impl FusedIterator for SctpParamIter<'_> {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn param(ptype: u16, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&ptype.to_be_bytes());
        out.extend_from_slice(&((value.len() + 4) as u16).to_be_bytes());
        out.extend_from_slice(value);
        out.resize(padded_len(out.len()), 0);
        out
    }

    #[test]
    fn test_padded_len() {
        for len in 0..64usize {
            let expected = if len % 4 == 0 { len } else { (len / 4 + 1) * 4 };
            assert_eq!(padded_len(len), expected);
        }
    }

    #[test]
    fn test_param_header_size() {
        assert_eq!(std::mem::size_of::<ParamHeader>(), PARAM_HEADER_LEN);
    }

    #[test]
    fn test_single_param() {
        let data = param(5, &[192, 168, 1, 1]);
        let mut iter = parse_params(&data);

        let p = iter.next().unwrap();
        assert_eq!(p.param_type(), ParamType::IPV4_ADDRESS);
        assert_eq!(p.length(), 8);
        assert_eq!(p.padded_length(), 8);
        assert_eq!(p.data_len(), 4);
        assert_eq!(p.value(), &[192, 168, 1, 1]);
        assert!(!p.is_truncated());

        assert!(iter.next().is_none());
        assert_eq!(iter.remaining(), 0);
    }

    #[test]
    fn test_odd_length_param_is_padded() {
        // host name "abc": 4 + 3 = 7 bytes declared, 8 on the wire
        let mut data = param(11, b"abc");
        assert_eq!(data.len(), 8);
        data.extend_from_slice(&param(5, &[10, 0, 0, 1]));

        let params: Vec<_> = parse_params(&data).collect();
        assert_eq!(params.len(), 2);

        assert_eq!(params[0].length(), 7);
        assert_eq!(params[0].padded_length(), 8);
        assert_eq!(params[0].value(), b"abc");

        assert_eq!(params[1].param_type(), ParamType::IPV4_ADDRESS);
        assert_eq!(params[1].value(), &[10, 0, 0, 1]);
    }

    #[test]
    fn test_wire_order_preserved() {
        let mut data = Vec::new();
        data.extend_from_slice(&param(12, &[0, 5]));
        data.extend_from_slice(&param(9, &1000u32.to_be_bytes()));
        data.extend_from_slice(&param(12, &[0, 6]));

        let types: Vec<u16> = parse_params(&data).map(|p| p.param_type().into()).collect();
        assert_eq!(types, vec![12, 9, 12]);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut data = param(1, &[1, 2, 3, 4]);
        data.extend_from_slice(&[0x00, 0x05, 0x00]);

        let mut iter = parse_params(&data);
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert_eq!(iter.remaining(), 3);
    }

    #[test]
    fn test_zero_length_halts() {
        let mut data = vec![0x00, 0x05, 0x00, 0x00];
        data.extend_from_slice(&param(5, &[1, 1, 1, 1]));

        let mut iter = parse_params(&data);
        let bad = iter.next().unwrap();
        assert_eq!(bad.length(), 0);
        assert_eq!(bad.data_len(), 0);
        assert!(bad.value().is_empty());

        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        assert_eq!(iter.remaining(), data.len());
    }

    #[test]
    fn test_overrunning_param_is_clamped() {
        // declares 20 bytes but only 6 follow
        let data = [0x00, 0x07, 0x00, 0x14, 0xAA, 0xBB];

        let mut iter = parse_params(&data);
        let p = iter.next().unwrap();
        assert_eq!(p.param_type(), ParamType::STATE_COOKIE);
        assert_eq!(p.data_len(), 16);
        assert_eq!(p.value(), &[0xAA, 0xBB]);
        assert!(p.is_truncated());

        assert!(iter.next().is_none());
    }

    #[test]
    fn test_missing_final_padding_tolerated() {
        // last record declares 5 bytes and the buffer stops right there
        let data = [0x00, 0x0B, 0x00, 0x05, b'x'];

        let params: Vec<_> = parse_params(&data).collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].value(), b"x");
        assert!(!params[0].is_truncated());
    }

    #[test]
    fn test_iterator_restartable() {
        let mut data = param(5, &[1, 2, 3, 4]);
        data.extend_from_slice(&param(6, &[0u8; 16]));

        let iter = parse_params(&data);
        assert_eq!(iter.clone().count(), 2);
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn test_empty_buffer() {
        assert!(parse_params(&[]).next().is_none());
    }

    #[test]
    fn test_cause_view() {
        let data = param(12, b"bye");
        let p = parse_params(&data).next().unwrap();
        assert_eq!(p.cause(), ErrorCause::USER_INITIATED_ABORT);
        assert_eq!(format!("{}", p), "supported-address-types(3)");
    }
}
