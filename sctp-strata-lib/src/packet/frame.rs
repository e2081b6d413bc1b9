//! Locating SCTP inside captured frames
//!
//! A capture hands over whole link-layer frames. [`locate_sctp`] walks the link and
//! network headers down to the SCTP common header and returns the transport payload
//! with the IP addresses it travelled between:
//!
//! - link: Ethernet II (with any number of stacked 802.1Q/802.1ad tags), Linux
//!   cooked capture v1/v2, BSD Null/Loopback or raw IP
//! - network: IPv4 (the payload is bounded by the total length field) or IPv6
//!   (hop-by-hop, routing and destination options headers are skipped)
//!
//! Traffic that is not SCTP yields `Ok(None)`, and so do IP fragments since
//! reassembly is left to the capture side. Headers cut short yield an error.
//!
//! # Examples
//!
//! ```
//! use sctp_strata::packet::frame::{guess_link_type, locate_sctp, LinkType};
//!
//! let mut frame = vec![
//!     0x45, 0x00, 0x00, 0x24, // IPv4, IHL 5, total length 36
//!     0x00, 0x01, 0x40, 0x00, // id 1, don't fragment
//!     0x40, 0x84, 0x00, 0x00, // TTL 64, protocol SCTP
//!     10, 0, 0, 1,            // source
//!     10, 0, 0, 2,            // destination
//! ];
//! frame.extend_from_slice(&[
//!     0x0B, 0x59, 0x0B, 0x59, 0, 0, 0, 1, 0, 0, 0, 0, // SCTP common header
//!     0x0B, 0x00, 0x00, 0x04, // COOKIE ACK
//! ]);
//!
//! let link_type = guess_link_type(&frame);
//! assert_eq!(link_type, LinkType::RawIpv4);
//!
//! let sctp = locate_sctp(&frame, link_type).unwrap().unwrap();
//! assert_eq!(sctp.src.to_string(), "10.0.0.1");
//! assert_eq!(sctp.payload.len(), 16);
//! ```

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{HeaderParser, PacketHeader, PacketHeaderError};

/// IP protocol number of SCTP
pub const IPPROTO_SCTP: u8 = 132;

const IPV6_HOP_BY_HOP: u8 = 0;
const IPV6_ROUTING: u8 = 43;
const IPV6_FRAGMENT: u8 = 44;
const IPV6_DEST_OPTS: u8 = 60;

crate::protocol_constants! {
    /// EtherType of the payload carried by a link-layer frame.
    EtherType, U16<BigEndian>, u16:
        IPV4 = 0x0800;
        ARP = 0x0806;
        VLAN_8021Q = 0x8100;
        IPV6 = 0x86DD;
        VLAN_8021AD = 0x88A8;
        VLAN_QINQ = 0x9100;
        MPLS_UC = 0x8847;
        MPLS_MC = 0x8848;
        PPPOE_DISC = 0x8863;
        PPPOE_SESS = 0x8864;
}

/// Link layer type for the packet capture
///
/// This determines what protocol to expect at the beginning of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// Standard Ethernet II frame
    Ethernet,
    /// Linux cooked capture v1 (SLL)
    Sll,
    /// Linux cooked capture v2 (SLLv2)
    Sllv2,
    /// BSD Null/Loopback encapsulation
    Null,
    /// Raw IPv4 (no link layer header)
    RawIpv4,
    /// Raw IPv6 (no link layer header)
    RawIpv6,
}

/// Guesses the link layer type by looking at the first bytes of a frame.
///
/// Captures carry the link type in their file header; this is for the cases where
/// it is missing or untrusted. Falls back to Ethernet.
pub fn guess_link_type(buf: &[u8]) -> LinkType {
    let Some(&first_byte) = buf.first() else {
        return LinkType::Ethernet;
    };

    // Fast path: raw IP
    match first_byte >> 4 {
        4 if (first_byte & 0x0F) >= 5 => return LinkType::RawIpv4,
        6 => return LinkType::RawIpv6,
        _ => {}
    }

    // Null/Loopback: 4-byte AF_* in host byte order, then IP
    if let Some(family) = buf.first_chunk::<4>() {
        let is_valid_af = |v: u32| matches!(v, 2 | 10 | 24 | 28 | 30);
        if (is_valid_af(u32::from_le_bytes(*family)) || is_valid_af(u32::from_be_bytes(*family)))
            && buf.get(4).is_some_and(|b| matches!(b >> 4, 4 | 6))
        {
            return LinkType::Null;
        }
    }

    // Ethernet: EtherType at 12-13
    if buf.len() >= 14 {
        let ether_type = EtherType::from(u16::from_be_bytes([buf[12], buf[13]]));
        if ether_type.is_known() {
            return LinkType::Ethernet;
        }
    }

    // SLL: packet type 0-4 at 0-1, protocol at 14-15
    if buf.len() >= 16 {
        let packet_type = u16::from_be_bytes([buf[0], buf[1]]);
        let protocol = u16::from_be_bytes([buf[14], buf[15]]);
        if packet_type <= 4 && matches!(protocol, 0x0800 | 0x86DD | 0x0806 | 0x8100) {
            return LinkType::Sll;
        }
    }

    // SLLv2: protocol at 0-1, packet type at 10
    if buf.len() >= 20 {
        let protocol = u16::from_be_bytes([buf[0], buf[1]]);
        if buf[10] <= 4 && matches!(protocol, 0x0800 | 0x86DD | 0x0806 | 0x8100) {
            return LinkType::Sllv2;
        }
    }

    LinkType::Ethernet
}

/// An SCTP packet found inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SctpFrame<'a> {
    pub src: IpAddr,
    pub dst: IpAddr,
    /// Transport payload, starting at the SCTP common header
    pub payload: &'a [u8],
}

/// Walks the link and network headers of `buf` down to SCTP.
///
/// Returns `Ok(None)` for non-SCTP traffic and for IP fragments.
pub fn locate_sctp(
    buf: &[u8],
    link_type: LinkType,
) -> Result<Option<SctpFrame<'_>>, PacketHeaderError> {
    let (ether_type, network) = match link_type {
        LinkType::Ethernet => {
            let (header, mut rest) = EtherHeader::from_bytes(buf)?;
            let mut ether_type = header.ether_type;
            while matches!(
                ether_type,
                EtherType::VLAN_8021Q | EtherType::VLAN_8021AD | EtherType::VLAN_QINQ
            ) {
                let (tag, inner) = VlanTag::from_bytes(rest)?;
                ether_type = tag.ether_type;
                rest = inner;
            }
            (ether_type, rest)
        }
        LinkType::Sll => {
            let (header, rest) = SllHeader::from_bytes(buf)?;
            (header.protocol, rest)
        }
        LinkType::Sllv2 => {
            let (header, rest) = Sllv2Header::from_bytes(buf)?;
            (header.protocol, rest)
        }
        LinkType::Null => {
            let (header, rest) = NullHeader::from_bytes(buf)?;
            (header.ether_type(), rest)
        }
        LinkType::RawIpv4 | LinkType::RawIpv6 => match buf.first().map(|b| b >> 4) {
            Some(4) => (EtherType::IPV4, buf),
            Some(6) => (EtherType::IPV6, buf),
            Some(_) => return Err(PacketHeaderError::Invalid("raw IP version")),
            None => return Err(PacketHeaderError::TooShort("raw IP")),
        },
    };

    match ether_type {
        EtherType::IPV4 => locate_in_ipv4(network),
        EtherType::IPV6 => locate_in_ipv6(network),
        _ => Ok(None),
    }
}

fn locate_in_ipv4(buf: &[u8]) -> Result<Option<SctpFrame<'_>>, PacketHeaderError> {
    let (header, rest) = Ipv4Header::from_bytes(buf)?;

    if header.is_fragment() || header.protocol != IPPROTO_SCTP {
        return Ok(None);
    }

    // a zero total length shows up with segmentation offload; trust the capture then
    let total_len = header.total_len.get() as usize;
    let payload = if total_len == 0 {
        rest
    } else {
        let len = total_len
            .checked_sub(header.header_len())
            .ok_or(PacketHeaderError::InsufficientLength(Ipv4Header::NAME))?;
        &rest[..len.min(rest.len())]
    };

    Ok(Some(SctpFrame {
        src: IpAddr::V4(Ipv4Addr::from(header.src)),
        dst: IpAddr::V4(Ipv4Addr::from(header.dst)),
        payload,
    }))
}

fn locate_in_ipv6(buf: &[u8]) -> Result<Option<SctpFrame<'_>>, PacketHeaderError> {
    let (header, rest) = Ipv6Header::from_bytes(buf)?;

    let payload_len = header.payload_len.get() as usize;
    let mut rest = if payload_len != 0 {
        &rest[..payload_len.min(rest.len())]
    } else {
        rest
    };

    let mut next_header = header.next_header;
    loop {
        match next_header {
            IPPROTO_SCTP => break,
            IPV6_HOP_BY_HOP | IPV6_ROUTING | IPV6_DEST_OPTS => {
                let [next, len, ..] = *rest else {
                    return Err(PacketHeaderError::TooShort("Ipv6ExtHeader"));
                };
                let ext_len = (len as usize + 1) * 8;
                if rest.len() < ext_len {
                    return Err(PacketHeaderError::TooShort("Ipv6ExtHeader"));
                }
                next_header = next;
                rest = &rest[ext_len..];
            }
            // reassembly happens upstream
            IPV6_FRAGMENT => return Ok(None),
            _ => return Ok(None),
        }
    }

    Ok(Some(SctpFrame {
        src: IpAddr::V6(Ipv6Addr::from(header.src)),
        dst: IpAddr::V6(Ipv6Addr::from(header.dst)),
        payload: rest,
    }))
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
struct EtherHeader {
    _dest: [u8; 6],
    _source: [u8; 6],
    ether_type: EtherType,
}

impl PacketHeader for EtherHeader {
    const NAME: &'static str = "EtherHeader";
    type InnerType = EtherType;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.ether_type
    }
}

impl HeaderParser for EtherHeader {
    type Output<'a> = &'a EtherHeader;

    #[inline]
    fn into_view<'a>(header: &'a Self, _: &'a [u8]) -> Self::Output<'a> {
        header
    }
}

/// 802.1Q/802.1ad tag, as it follows the outer EtherType
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
struct VlanTag {
    _tci: U16<BigEndian>,
    ether_type: EtherType,
}

impl PacketHeader for VlanTag {
    const NAME: &'static str = "VlanTag";
    type InnerType = EtherType;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.ether_type
    }
}

impl HeaderParser for VlanTag {
    type Output<'a> = &'a VlanTag;

    #[inline]
    fn into_view<'a>(header: &'a Self, _: &'a [u8]) -> Self::Output<'a> {
        header
    }
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
struct SllHeader {
    _packet_type: U16<BigEndian>,
    _arphrd_type: U16<BigEndian>,
    _ll_addr_len: U16<BigEndian>,
    _ll_addr: [u8; 8],
    protocol: EtherType,
}

impl PacketHeader for SllHeader {
    const NAME: &'static str = "SllHeader";
    type InnerType = EtherType;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.protocol
    }
}

impl HeaderParser for SllHeader {
    type Output<'a> = &'a SllHeader;

    #[inline]
    fn into_view<'a>(header: &'a Self, _: &'a [u8]) -> Self::Output<'a> {
        header
    }
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
struct Sllv2Header {
    protocol: EtherType,
    _reserved: U16<BigEndian>,
    _interface_index: U32<BigEndian>,
    _arphrd_type: U16<BigEndian>,
    _packet_type: u8,
    _ll_addr_len: u8,
    _ll_addr: [u8; 8],
}

impl PacketHeader for Sllv2Header {
    const NAME: &'static str = "Sllv2Header";
    type InnerType = EtherType;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.protocol
    }
}

impl HeaderParser for Sllv2Header {
    type Output<'a> = &'a Sllv2Header;

    #[inline]
    fn into_view<'a>(header: &'a Self, _: &'a [u8]) -> Self::Output<'a> {
        header
    }
}

/// BSD loopback: address family in the capturing host's byte order
#[repr(C)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
struct NullHeader {
    family: [u8; 4],
}

impl NullHeader {
    fn ether_type(&self) -> EtherType {
        let family = match u32::from_le_bytes(self.family) {
            v @ (2 | 10 | 24 | 28 | 30) => v,
            _ => u32::from_be_bytes(self.family),
        };
        match family {
            2 => EtherType::IPV4,
            10 | 24 | 28 | 30 => EtherType::IPV6,
            _ => EtherType::default(),
        }
    }
}

impl PacketHeader for NullHeader {
    const NAME: &'static str = "NullHeader";
    type InnerType = EtherType;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.ether_type()
    }
}

impl HeaderParser for NullHeader {
    type Output<'a> = &'a NullHeader;

    #[inline]
    fn into_view<'a>(header: &'a Self, _: &'a [u8]) -> Self::Output<'a> {
        header
    }
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
struct Ipv4Header {
    ver_ihl: u8,
    _tos: u8,
    total_len: U16<BigEndian>,
    _id: U16<BigEndian>,
    flags_frag_offset: U16<BigEndian>,
    _ttl: u8,
    protocol: u8,
    _checksum: U16<BigEndian>,
    src: [u8; 4],
    dst: [u8; 4],
}

impl Ipv4Header {
    const FLAG_MF: u16 = 0x2000;
    const FRAG_OFFSET_MASK: u16 = 0x1FFF;

    #[inline]
    fn header_len(&self) -> usize {
        (self.ver_ihl & 0x0F) as usize * 4
    }

    #[inline]
    fn is_fragment(&self) -> bool {
        let flags_frag = self.flags_frag_offset.get();
        (flags_frag & Self::FLAG_MF) != 0 || (flags_frag & Self::FRAG_OFFSET_MASK) != 0
    }
}

impl PacketHeader for Ipv4Header {
    const NAME: &'static str = "Ipv4Header";
    type InnerType = u8;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.protocol
    }

    /// Header length including options
    #[inline]
    fn total_len(&self, _buf: &[u8]) -> usize {
        self.header_len()
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.ver_ihl >> 4 == 4 && self.header_len() >= Self::FIXED_LEN
    }
}

impl HeaderParser for Ipv4Header {
    type Output<'a> = &'a Ipv4Header;

    #[inline]
    fn into_view<'a>(header: &'a Self, _options: &'a [u8]) -> Self::Output<'a> {
        header
    }
}

#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout, Debug, Clone, Copy)]
struct Ipv6Header {
    ver_tc_flow: U32<BigEndian>,
    payload_len: U16<BigEndian>,
    next_header: u8,
    _hop_limit: u8,
    src: [u8; 16],
    dst: [u8; 16],
}

impl PacketHeader for Ipv6Header {
    const NAME: &'static str = "Ipv6Header";
    type InnerType = u8;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.next_header
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.ver_tc_flow.get() >> 28 == 6
    }
}

impl HeaderParser for Ipv6Header {
    type Output<'a> = &'a Ipv6Header;

    #[inline]
    fn into_view<'a>(header: &'a Self, _: &'a [u8]) -> Self::Output<'a> {
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCTP: [u8; 16] = [
        0x0B, 0x59, 0x0B, 0x59, // ports 2905
        0x00, 0x00, 0x00, 0x01, // verification tag
        0x00, 0x00, 0x00, 0x00, // checksum
        0x0B, 0x00, 0x00, 0x04, // COOKIE ACK
    ];

    fn ipv4(protocol: u8, flags_frag: u16, payload: &[u8]) -> Vec<u8> {
        let total = (20 + payload.len()) as u16;
        let mut pkt = vec![0x45, 0x00];
        pkt.extend_from_slice(&total.to_be_bytes());
        pkt.extend_from_slice(&[0x00, 0x07]); // id
        pkt.extend_from_slice(&flags_frag.to_be_bytes());
        pkt.extend_from_slice(&[64, protocol, 0x00, 0x00]);
        pkt.extend_from_slice(&[192, 168, 0, 1]);
        pkt.extend_from_slice(&[192, 168, 0, 2]);
        pkt.extend_from_slice(payload);
        pkt
    }

    fn ipv6(next_header: u8, payload: &[u8]) -> Vec<u8> {
        let mut pkt = vec![0x60, 0x00, 0x00, 0x00];
        pkt.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        pkt.extend_from_slice(&[next_header, 64]);
        pkt.extend_from_slice(&Ipv6Addr::LOCALHOST.octets());
        pkt.extend_from_slice(&Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2).octets());
        pkt.extend_from_slice(payload);
        pkt
    }

    fn ether(ether_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55]; // dest
        frame.extend_from_slice(&[0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB]); // source
        frame.extend_from_slice(&ether_type.to_be_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn test_header_sizes() {
        assert_eq!(EtherHeader::FIXED_LEN, 14);
        assert_eq!(VlanTag::FIXED_LEN, 4);
        assert_eq!(SllHeader::FIXED_LEN, 16);
        assert_eq!(Sllv2Header::FIXED_LEN, 20);
        assert_eq!(Ipv4Header::FIXED_LEN, 20);
        assert_eq!(Ipv6Header::FIXED_LEN, 40);
    }

    #[test]
    fn test_ethernet_ipv4_sctp() {
        let frame = ether(0x0800, &ipv4(IPPROTO_SCTP, 0x4000, &SCTP));
        let found = locate_sctp(&frame, LinkType::Ethernet).unwrap().unwrap();

        assert_eq!(found.src, IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1)));
        assert_eq!(found.dst, IpAddr::V4(Ipv4Addr::new(192, 168, 0, 2)));
        assert_eq!(found.payload, &SCTP);
    }

    #[test]
    fn test_ethernet_padding_is_dropped() {
        let mut frame = ether(0x0800, &ipv4(IPPROTO_SCTP, 0, &SCTP));
        frame.extend_from_slice(&[0; 6]); // minimum frame size padding
        let found = locate_sctp(&frame, LinkType::Ethernet).unwrap().unwrap();
        assert_eq!(found.payload.len(), SCTP.len());
    }

    #[test]
    fn test_stacked_vlan_tags() {
        let mut inner = vec![0x00, 0x64, 0x81, 0x00]; // 802.1ad tag, then 802.1Q
        inner.extend_from_slice(&[0x00, 0xC8, 0x08, 0x00]); // 802.1Q tag, then IPv4
        inner.extend_from_slice(&ipv4(IPPROTO_SCTP, 0, &SCTP));
        let frame = ether(0x88A8, &inner);

        let found = locate_sctp(&frame, LinkType::Ethernet).unwrap().unwrap();
        assert_eq!(found.payload, &SCTP);
    }

    #[test]
    fn test_non_sctp_is_none() {
        let udp = ether(0x0800, &ipv4(17, 0, &[0; 8]));
        assert_eq!(locate_sctp(&udp, LinkType::Ethernet).unwrap(), None);

        let arp = ether(0x0806, &[0; 28]);
        assert_eq!(locate_sctp(&arp, LinkType::Ethernet).unwrap(), None);
    }

    #[test]
    fn test_ipv4_fragments_are_skipped() {
        // more fragments set
        let first = ipv4(IPPROTO_SCTP, 0x2000, &SCTP);
        assert_eq!(locate_sctp(&first, LinkType::RawIpv4).unwrap(), None);

        // non-zero offset
        let later = ipv4(IPPROTO_SCTP, 0x0003, &SCTP);
        assert_eq!(locate_sctp(&later, LinkType::RawIpv4).unwrap(), None);
    }

    #[test]
    fn test_ipv4_with_options() {
        let mut pkt = ipv4(IPPROTO_SCTP, 0, &[]);
        pkt[0] = 0x46; // IHL 6
        pkt.extend_from_slice(&[0x01, 0x01, 0x01, 0x00]); // NOPs + EOL
        pkt.extend_from_slice(&SCTP);
        let total = pkt.len() as u16;
        pkt[2..4].copy_from_slice(&total.to_be_bytes());

        let found = locate_sctp(&pkt, LinkType::RawIpv4).unwrap().unwrap();
        assert_eq!(found.payload, &SCTP);
    }

    #[test]
    fn test_ipv4_bad_header_length() {
        let mut pkt = ipv4(IPPROTO_SCTP, 0, &SCTP);
        pkt[0] = 0x44; // IHL 4 is below the minimum
        assert_eq!(
            locate_sctp(&pkt, LinkType::RawIpv4),
            Err(PacketHeaderError::Invalid("Ipv4Header"))
        );
    }

    #[test]
    fn test_ipv4_total_length_below_header() {
        let mut pkt = ipv4(IPPROTO_SCTP, 0, &SCTP);
        pkt[2..4].copy_from_slice(&16u16.to_be_bytes()); // shorter than IHL 5
        assert_eq!(
            locate_sctp(&pkt, LinkType::RawIpv4),
            Err(PacketHeaderError::InsufficientLength("Ipv4Header"))
        );
    }

    #[test]
    fn test_ipv6_with_extension_headers() {
        let mut payload = vec![IPV6_DEST_OPTS, 0, 1, 4, 0, 0, 0, 0]; // hop-by-hop, 8 bytes
        payload.extend_from_slice(&[IPPROTO_SCTP, 1]); // destination options, 16 bytes
        payload.extend_from_slice(&[0; 14]);
        payload.extend_from_slice(&SCTP);
        let pkt = ipv6(IPV6_HOP_BY_HOP, &payload);

        let found = locate_sctp(&pkt, LinkType::RawIpv6).unwrap().unwrap();
        assert_eq!(found.src, IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(found.payload, &SCTP);
    }

    #[test]
    fn test_ipv6_fragment_is_skipped() {
        let mut payload = vec![IPPROTO_SCTP, 0, 0, 1, 0, 0, 0, 9];
        payload.extend_from_slice(&SCTP);
        let pkt = ipv6(IPV6_FRAGMENT, &payload);
        assert_eq!(locate_sctp(&pkt, LinkType::RawIpv6).unwrap(), None);
    }

    #[test]
    fn test_ipv6_truncated_extension() {
        let pkt = ipv6(IPV6_ROUTING, &[IPPROTO_SCTP, 2, 0, 0]);
        assert_eq!(
            locate_sctp(&pkt, LinkType::RawIpv6),
            Err(PacketHeaderError::TooShort("Ipv6ExtHeader"))
        );
    }

    #[test]
    fn test_sll_and_null() {
        let mut sll = vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x06];
        sll.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x00, 0x00]);
        sll.extend_from_slice(&[0x86, 0xDD]);
        sll.extend_from_slice(&ipv6(IPPROTO_SCTP, &SCTP));
        let found = locate_sctp(&sll, LinkType::Sll).unwrap().unwrap();
        assert_eq!(found.payload, &SCTP);

        let mut null = 2u32.to_le_bytes().to_vec();
        null.extend_from_slice(&ipv4(IPPROTO_SCTP, 0, &SCTP));
        let found = locate_sctp(&null, LinkType::Null).unwrap().unwrap();
        assert_eq!(found.payload, &SCTP);
    }

    #[test]
    fn test_sllv2() {
        let mut sll2 = vec![0x08, 0x00, 0x00, 0x00]; // protocol, reserved
        sll2.extend_from_slice(&3u32.to_be_bytes()); // interface index
        sll2.extend_from_slice(&[0x00, 0x01, 0x00, 0x06]); // ARPHRD, packet type, addr len
        sll2.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x00, 0x00]);
        sll2.extend_from_slice(&ipv4(IPPROTO_SCTP, 0, &SCTP));

        let found = locate_sctp(&sll2, LinkType::Sllv2).unwrap().unwrap();
        assert_eq!(found.payload, &SCTP);
    }

    #[test]
    fn test_truncated_frames() {
        assert_eq!(
            locate_sctp(&[0u8; 10], LinkType::Ethernet),
            Err(PacketHeaderError::TooShort("EtherHeader"))
        );
        let frame = ether(0x8100, &[0x00, 0x01]);
        assert_eq!(
            locate_sctp(&frame, LinkType::Ethernet),
            Err(PacketHeaderError::TooShort("VlanTag"))
        );
        assert_eq!(
            locate_sctp(&[], LinkType::RawIpv4),
            Err(PacketHeaderError::TooShort("raw IP"))
        );
    }

    #[test]
    fn test_guess_link_type() {
        assert_eq!(guess_link_type(&ipv4(IPPROTO_SCTP, 0, &SCTP)), LinkType::RawIpv4);
        assert_eq!(guess_link_type(&ipv6(IPPROTO_SCTP, &SCTP)), LinkType::RawIpv6);
        assert_eq!(
            guess_link_type(&ether(0x0800, &ipv4(IPPROTO_SCTP, 0, &SCTP))),
            LinkType::Ethernet
        );

        let mut null = 2u32.to_le_bytes().to_vec();
        null.extend_from_slice(&ipv4(IPPROTO_SCTP, 0, &SCTP));
        assert_eq!(guess_link_type(&null), LinkType::Null);

        assert_eq!(guess_link_type(&[]), LinkType::Ethernet);
    }

    #[test]
    fn test_ether_type_names() {
        assert_eq!(EtherType::IPV6.to_string(), "ipv6");
        assert_eq!(EtherType::from(0x9100), EtherType::VLAN_QINQ);
        assert!(!EtherType::from(0x1234).is_known());
    }
}
