//! INIT (type 1) and INIT ACK (type 2) chunks
//!
//! Both share the same fixed part, followed by optional/variable-length parameters:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 1    |  Chunk Flags  |      Chunk Length             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Initiate Tag                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           Advertised Receiver Window Credit (a_rwnd)          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Number of Outbound Streams   |  Number of Inbound Streams    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          Initial TSN                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! \                                                               \
//! /              Optional/Variable-Length Parameters              /
//! \                                                               \
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The parameters are decoded by `parse_chunk_data`; until then the address,
//! cookie and extension accessors are empty. `params()` always walks the raw TLVs.

use std::fmt::{self, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::Deref;

use smallvec::SmallVec;
use smol_str::SmolStr;
use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Ref, Unaligned};

use super::RawChunk;
use crate::packet::protocol::ParamType;
use crate::packet::sctp::param::{parse_params, SctpParam, SctpParamIter};

/// Fixed part shared by INIT and INIT ACK
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
pub struct InitHeader {
    initiate_tag: U32<BigEndian>,
    a_rwnd: U32<BigEndian>,
    outbound_streams: U16<BigEndian>,
    inbound_streams: U16<BigEndian>,
    initial_tsn: U32<BigEndian>,
}

impl InitHeader {
    #[inline]
    pub fn initiate_tag(&self) -> u32 {
        self.initiate_tag.get()
    }

    #[inline]
    pub fn a_rwnd(&self) -> u32 {
        self.a_rwnd.get()
    }

    #[inline]
    pub fn outbound_streams(&self) -> u16 {
        self.outbound_streams.get()
    }

    #[inline]
    pub fn inbound_streams(&self) -> u16 {
        self.inbound_streams.get()
    }

    #[inline]
    pub fn initial_tsn(&self) -> u32 {
        self.initial_tsn.get()
    }
}

/// Addresses announced by an INIT or INIT ACK
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressList {
    pub ipv4: Vec<Ipv4Addr>,
    pub ipv6: Vec<Ipv6Addr>,
    pub host_names: Vec<SmolStr>,
}

impl AddressList {
    /// Records `param` if it carries an address and reports whether it did.
    /// Address values too short for their family are dropped.
    fn absorb(&mut self, param: &SctpParam<'_>) -> bool {
        let value = param.value();
        match param.param_type() {
            ParamType::IPV4_ADDRESS => {
                if let Some(octets) = value.first_chunk::<4>() {
                    self.ipv4.push(Ipv4Addr::from(*octets));
                }
            }
            ParamType::IPV6_ADDRESS => {
                if let Some(octets) = value.first_chunk::<16>() {
                    self.ipv6.push(Ipv6Addr::from(*octets));
                }
            }
            ParamType::HOST_NAME_ADDRESS => {
                let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
                self.host_names
                    .push(SmolStr::new(String::from_utf8_lossy(&value[..end])));
            }
            _ => return false,
        }
        true
    }
}

// Both chunk kinds expose the fixed INIT fields through their header view.
macro_rules! init_fixed_fields {
    ($chunk:ident) => {
        impl<'a> $chunk<'a> {
            #[inline]
            pub fn init_header(&self) -> &'a InitHeader {
                self.header
            }

            #[inline]
            pub fn initiate_tag(&self) -> u32 {
                self.header.initiate_tag()
            }

            /// Advertised receiver window credit
            #[inline]
            pub fn a_rwnd(&self) -> u32 {
                self.header.a_rwnd()
            }

            #[inline]
            pub fn outbound_streams(&self) -> u16 {
                self.header.outbound_streams()
            }

            #[inline]
            pub fn inbound_streams(&self) -> u16 {
                self.header.inbound_streams()
            }

            #[inline]
            pub fn initial_tsn(&self) -> u32 {
                self.header.initial_tsn()
            }

            /// Lazy walk over the raw parameters following the fixed part
            #[inline]
            pub fn params(&self) -> SctpParamIter<'a> {
                parse_params(self.params)
            }

            #[inline]
            pub fn is_parsed(&self) -> bool {
                self.parsed.is_some()
            }

            pub fn ipv4_addresses(&self) -> &[Ipv4Addr] {
                self.parsed
                    .as_ref()
                    .map_or(&[][..], |p| p.addresses.ipv4.as_slice())
            }

            pub fn ipv6_addresses(&self) -> &[Ipv6Addr] {
                self.parsed
                    .as_ref()
                    .map_or(&[][..], |p| p.addresses.ipv6.as_slice())
            }

            pub fn host_names(&self) -> &[SmolStr] {
                self.parsed
                    .as_ref()
                    .map_or(&[][..], |p| p.addresses.host_names.as_slice())
            }
        }

        impl<'a> Deref for $chunk<'a> {
            type Target = RawChunk<'a>;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.raw
            }
        }
    };
}

fn split_init<'a>(raw: &RawChunk<'a>) -> Option<(&'a InitHeader, &'a [u8])> {
    let (header, params) = Ref::<_, InitHeader>::from_prefix(raw.body()).ok()?;
    Some((Ref::into_ref(header), params))
}

#[derive(Debug, Clone, Default)]
struct InitParams {
    addresses: AddressList,
    cookie_life_span_increment: u32,
    supported_address_types: SmallVec<[u16; 4]>,
}

/// INIT chunk
#[derive(Debug, Clone)]
pub struct InitChunk<'a> {
    raw: RawChunk<'a>,
    header: &'a InitHeader,
    params: &'a [u8],
    parsed: Option<InitParams>,
}

init_fixed_fields!(InitChunk);

impl<'a> InitChunk<'a> {
    /// Returns `None` if the body cannot hold the 16-byte fixed part
    pub fn new(raw: RawChunk<'a>) -> Option<Self> {
        let (header, params) = split_init(&raw)?;
        Some(Self {
            raw,
            header,
            params,
            parsed: None,
        })
    }

    /// Decodes the optional parameters; unknown types are skipped
    pub fn parse_chunk_data(&mut self) {
        if self.parsed.is_some() {
            return;
        }

        let mut parsed = InitParams::default();
        for param in parse_params(self.params) {
            if parsed.addresses.absorb(&param) {
                continue;
            }
            match param.param_type() {
                ParamType::COOKIE_PRESERVATIVE => {
                    if let Some(be) = param.value().first_chunk::<4>() {
                        parsed.cookie_life_span_increment = u32::from_be_bytes(*be);
                    }
                }
                ParamType::SUPPORTED_ADDRESS_TYPES => {
                    parsed.supported_address_types.extend(
                        param
                            .value()
                            .chunks_exact(2)
                            .map(|c| u16::from_be_bytes([c[0], c[1]])),
                    );
                }
                _ => {}
            }
        }
        self.parsed = Some(parsed);
    }

    /// Suggested cookie life-span increment in milliseconds, 0 if absent
    pub fn cookie_life_span_increment(&self) -> u32 {
        self.parsed
            .as_ref()
            .map_or(0, |p| p.cookie_life_span_increment)
    }

    /// Address type codes (5, 6, 11) the sender supports
    pub fn supported_address_types(&self) -> &[u16] {
        self.parsed
            .as_ref()
            .map_or(&[][..], |p| p.supported_address_types.as_slice())
    }
}

impl fmt::Display for InitChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "init tag=0x{:08x} a_rwnd={} streams={}/{} tsn={}",
            self.initiate_tag(),
            self.a_rwnd(),
            self.outbound_streams(),
            self.inbound_streams(),
            self.initial_tsn()
        )
    }
}

#[derive(Debug, Clone, Default)]
struct InitAckParams<'a> {
    addresses: AddressList,
    state_cookie: Option<&'a [u8]>,
    unrecognized: Vec<SctpParam<'a>>,
}

/// INIT ACK chunk
#[derive(Debug, Clone)]
pub struct InitAckChunk<'a> {
    raw: RawChunk<'a>,
    header: &'a InitHeader,
    params: &'a [u8],
    parsed: Option<InitAckParams<'a>>,
}

init_fixed_fields!(InitAckChunk);

impl<'a> InitAckChunk<'a> {
    /// Returns `None` if the body cannot hold the 16-byte fixed part
    pub fn new(raw: RawChunk<'a>) -> Option<Self> {
        let (header, params) = split_init(&raw)?;
        Some(Self {
            raw,
            header,
            params,
            parsed: None,
        })
    }

    /// Decodes the optional parameters. A repeated state cookie replaces the
    /// previous one; every unrecognized-parameter value is walked as its own
    /// parameter sequence and appended in wire order.
    pub fn parse_chunk_data(&mut self) {
        if self.parsed.is_some() {
            return;
        }

        let mut parsed = InitAckParams::default();
        for param in parse_params(self.params) {
            if parsed.addresses.absorb(&param) {
                continue;
            }
            match param.param_type() {
                ParamType::STATE_COOKIE => parsed.state_cookie = Some(param.value()),
                ParamType::UNRECOGNIZED_PARAMETER => {
                    parsed.unrecognized.extend(parse_params(param.value()))
                }
                _ => {}
            }
        }
        self.parsed = Some(parsed);
    }

    pub fn state_cookie(&self) -> Option<&'a [u8]> {
        self.parsed.as_ref().and_then(|p| p.state_cookie)
    }

    pub fn state_cookie_len(&self) -> usize {
        self.state_cookie().map_or(0, <[u8]>::len)
    }

    /// Parameters the peer reported as unrecognized
    pub fn unrecognized_parameters(&self) -> &[SctpParam<'a>] {
        self.parsed
            .as_ref()
            .map_or(&[][..], |p| p.unrecognized.as_slice())
    }
}

impl fmt::Display for InitAckChunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "init-ack tag=0x{:08x} a_rwnd={} streams={}/{} tsn={}",
            self.initiate_tag(),
            self.a_rwnd(),
            self.outbound_streams(),
            self.inbound_streams(),
            self.initial_tsn()
        )?;
        if let Some(cookie) = self.state_cookie() {
            write!(f, " cookie={}", cookie.len())?;
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

    fn init_body(params: &[Vec<u8>]) -> Vec<u8> {
        let mut body = vec![
            0xAB, 0xCD, 0xEF, 0x01, // initiate tag
            0x00, 0x01, 0x00, 0x00, // a_rwnd 65536
            0x00, 0x0A, // outbound streams
            0x00, 0x05, // inbound streams
            0x00, 0x00, 0x00, 0x64, // initial TSN 100
        ];
        for p in params {
            body.extend_from_slice(p);
        }
        body
    }

    #[test]
    fn test_init_header_size() {
        assert_eq!(std::mem::size_of::<InitHeader>(), 16);
    }

    #[test]
    fn test_init_fixed_fields() {
        let bytes = chunk(0x01, 0, &init_body(&[]));
        let Chunk::Init(init) = decode(&bytes) else {
            panic!("expected INIT")
        };

        assert_eq!(init.initiate_tag(), 0xABCD_EF01);
        assert_eq!(init.a_rwnd(), 65536);
        assert_eq!(init.outbound_streams(), 10);
        assert_eq!(init.inbound_streams(), 5);
        assert_eq!(init.initial_tsn(), 100);
        assert_eq!(init.params().count(), 0);
        assert_eq!(
            init.to_string(),
            "init tag=0xabcdef01 a_rwnd=65536 streams=10/5 tsn=100"
        );
    }

    #[test]
    fn test_accessors_empty_until_parsed() {
        let bytes = chunk(
            0x01,
            0,
            &init_body(&[param(5, &[10, 0, 0, 1]), param(9, &[0, 0, 0x03, 0xE8])]),
        );
        let mut c = decode(&bytes);
        let Chunk::Init(init) = &c else {
            panic!("expected INIT")
        };
        assert!(!init.is_parsed());
        assert!(init.ipv4_addresses().is_empty());
        assert_eq!(init.cookie_life_span_increment(), 0);

        c.parse_chunk_data();
        let Chunk::Init(init) = &c else {
            panic!("expected INIT")
        };
        assert!(init.is_parsed());
        assert_eq!(init.ipv4_addresses(), &[Ipv4Addr::new(10, 0, 0, 1)]);
        assert_eq!(init.cookie_life_span_increment(), 1000);
    }

    #[test]
    fn test_odd_host_name_aligns_next_param() {
        let host = param(11, b"abc");
        assert_eq!(host.len(), 8);
        let bytes = chunk(0x01, 0, &init_body(&[host, param(5, &[192, 0, 2, 7])]));
        let Chunk::Init(mut init) = decode(&bytes) else {
            panic!("expected INIT")
        };

        let params: Vec<_> = init.params().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].length(), 7);
        assert_eq!(params[0].padded_length(), 8);
        // the address value starts 8 + 4 bytes into the parameter area
        let area = &init.body()[16..];
        assert_eq!(&area[12..16], params[1].value());

        init.parse_chunk_data();
        assert_eq!(init.host_names(), &[SmolStr::new("abc")]);
        assert_eq!(init.ipv4_addresses(), &[Ipv4Addr::new(192, 0, 2, 7)]);
    }

    #[test]
    fn test_init_all_parameter_kinds() {
        let v6 = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
        let bytes = chunk(
            0x01,
            0,
            &init_body(&[
                param(5, &[10, 0, 0, 1]),
                param(6, &v6.octets()),
                param(5, &[10, 0, 0, 2]),
                param(11, b"peer.example\0\0"),
                param(12, &[0x00, 0x05, 0x00, 0x06, 0x00, 0x0B]),
                param(0x8000, &[]), // ECN capable, skipped
                param(0xC000, &[]), // forward TSN, skipped
                param(5, &[10, 0]), // too short for an address
            ]),
        );
        let Chunk::Init(mut init) = decode(&bytes) else {
            panic!("expected INIT")
        };
        init.parse_chunk_data();

        assert_eq!(
            init.ipv4_addresses(),
            &[Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)]
        );
        assert_eq!(init.ipv6_addresses(), &[v6]);
        assert_eq!(init.host_names(), &[SmolStr::new("peer.example")]);
        assert_eq!(init.supported_address_types(), &[5, 6, 11]);
        assert_eq!(init.params().count(), 8);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let bytes = chunk(0x01, 0, &init_body(&[param(5, &[10, 0, 0, 1])]));
        let Chunk::Init(mut init) = decode(&bytes) else {
            panic!("expected INIT")
        };
        init.parse_chunk_data();
        init.parse_chunk_data();
        assert_eq!(init.ipv4_addresses().len(), 1);
    }

    #[test]
    fn test_short_init_is_generic() {
        let bytes = chunk(0x01, 0, &[0; 12]);
        assert!(matches!(decode(&bytes), Chunk::Generic(_)));
    }

    #[test]
    fn test_init_ack_cookie_and_addresses() {
        let bytes = chunk(
            0x02,
            0,
            &init_body(&[
                param(7, b"first-cookie"),
                param(5, &[172, 16, 0, 9]),
                param(7, b"second"),
            ]),
        );
        let Chunk::InitAck(mut ack) = decode(&bytes) else {
            panic!("expected INIT ACK")
        };
        assert_eq!(ack.state_cookie(), None);
        assert_eq!(ack.state_cookie_len(), 0);

        ack.parse_chunk_data();
        assert_eq!(ack.state_cookie(), Some(&b"second"[..]));
        assert_eq!(ack.state_cookie_len(), 6);
        assert_eq!(ack.ipv4_addresses(), &[Ipv4Addr::new(172, 16, 0, 9)]);
        assert_eq!(
            ack.to_string(),
            "init-ack tag=0xabcdef01 a_rwnd=65536 streams=10/5 tsn=100 cookie=6"
        );
    }

    #[test]
    fn test_init_ack_unrecognized_parameters_nested() {
        let mut first = param(0x8001, &[1, 2, 3, 4]);
        first.extend_from_slice(&param(0x8002, &[]));
        let second = param(0x4003, &[9]);

        let bytes = chunk(
            0x02,
            0,
            &init_body(&[param(8, &first), param(7, b"c"), param(8, &second)]),
        );
        let Chunk::InitAck(mut ack) = decode(&bytes) else {
            panic!("expected INIT ACK")
        };
        ack.parse_chunk_data();

        let codes: Vec<u16> = ack
            .unrecognized_parameters()
            .iter()
            .map(|p| p.param_type().into())
            .collect();
        assert_eq!(codes, vec![0x8001, 0x8002, 0x4003]);
        assert_eq!(ack.unrecognized_parameters()[0].value(), &[1, 2, 3, 4]);
        assert_eq!(ack.state_cookie(), Some(&b"c"[..]));
    }
}
