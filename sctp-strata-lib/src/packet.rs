use std::mem;
use thiserror::Error;
use zerocopy::{FromBytes, Immutable, KnownLayout, Ref, Unaligned};

pub mod frame;
pub mod protocol;
pub mod sctp;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketHeaderError {
    #[error("buffer too short for {0}")]
    TooShort(&'static str),
    #[error("invalid {0}")]
    Invalid(&'static str),
    #[error("insufficient buffer length for {0}")]
    InsufficientLength(&'static str),
}

pub trait PacketHeader: Sized {
    const FIXED_LEN: usize = mem::size_of::<Self>();
    const NAME: &'static str;
    type InnerType;

    /// return the inner type of the header
    fn inner_type(&self) -> Self::InnerType;

    /// Returns the number of bytes, starting at the header, that belong to this layer.
    /// Variable-length layers use the buffer to work it out.
    fn total_len(&self, buf: &[u8]) -> usize {
        let _ = buf;
        Self::FIXED_LEN
    }

    /// check whether the header is valid
    #[inline]
    fn is_valid(&self) -> bool {
        true
    }
}

pub trait HeaderParser: PacketHeader + FromBytes + KnownLayout + Immutable + Unaligned {
    /// The high-level view returned to the user.
    /// Can be `&'a Self` for fixed headers or a custom wrapper<'a> for variable ones.
    type Output<'a>
    where
        Self: 'a;

    /// Build the view from the fixed header and the variable part that follows it.
    fn into_view<'a>(header: &'a Self, rest: &'a [u8]) -> Self::Output<'a>;

    /// parse the layer, ensuring validity and length
    #[inline]
    fn from_bytes<'a>(buf: &'a [u8]) -> Result<(Self::Output<'a>, &'a [u8]), PacketHeaderError> {
        let (header_ref, rest_buf) = Ref::<_, Self>::from_prefix(buf)
            .map_err(|_| PacketHeaderError::TooShort(Self::NAME))?;

        if !header_ref.is_valid() {
            return Err(PacketHeaderError::Invalid(Self::NAME));
        }

        let header = Ref::into_ref(header_ref);

        let total_len = header.total_len(buf);
        let variable_len = total_len
            .checked_sub(Self::FIXED_LEN)
            .ok_or(PacketHeaderError::Invalid(Self::NAME))?;

        if rest_buf.len() < variable_len {
            return Err(PacketHeaderError::TooShort(Self::NAME));
        }

        let (variable, payload) = rest_buf.split_at(variable_len);

        Ok((Self::into_view(header, variable), payload))
    }
}
