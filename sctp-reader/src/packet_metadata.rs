use std::cmp::min;
use std::fmt::{self, Display};

use chrono::DateTime;
use pcap_parser::{EnhancedPacketBlock, LegacyPcapBlock, Linktype, SimplePacketBlock};
use sctp_strata::packet::frame::LinkType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimestampNsec(u64);

impl Display for TimestampNsec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / 1_000_000_000;
        let nsecs = self.0 % 1_000_000_000;

        if !f.alternate() {
            if let Some(date_time) = DateTime::from_timestamp(secs as i64, nsecs as u32) {
                return write!(f, "{}", date_time.format("%Y-%m-%d %H:%M:%S%.6f UTC"));
            }
        }

        write!(f, "{}.{:09}", secs, nsecs)
    }
}

/// What the reader needs from a captured packet, whatever block it came in
pub trait PacketMetadata {
    fn caplen(&self) -> u32;
    fn data(&self) -> &[u8];
    fn timestamp(&self) -> TimestampNsec;
}

impl PacketMetadata for LegacyPcapBlock<'_> {
    #[inline]
    fn timestamp(&self) -> TimestampNsec {
        TimestampNsec((self.ts_sec as u64) * 1_000_000_000 + self.ts_usec as u64 * 1000)
    }

    #[inline]
    fn caplen(&self) -> u32 {
        self.caplen
    }

    #[inline]
    fn data(&self) -> &[u8] {
        self.data
    }
}

impl PacketMetadata for EnhancedPacketBlock<'_> {
    #[inline]
    fn timestamp(&self) -> TimestampNsec {
        let raw_ts = ((self.ts_high as u64) << 32) | (self.ts_low as u64);

        // the default interface resolution is microseconds; nanosecond captures
        // land between 1973 and 2106 when read as seconds * 10^9
        if (100_000_000..=4_000_000_000).contains(&(raw_ts / 1_000_000_000)) {
            TimestampNsec(raw_ts)
        } else {
            TimestampNsec(raw_ts * 1000)
        }
    }

    #[inline]
    fn caplen(&self) -> u32 {
        self.caplen
    }

    #[inline]
    fn data(&self) -> &[u8] {
        self.data
    }
}

impl PacketMetadata for SimplePacketBlock<'_> {
    #[inline]
    fn timestamp(&self) -> TimestampNsec {
        TimestampNsec(0)
    }

    #[inline]
    fn caplen(&self) -> u32 {
        min(self.origlen, self.data.len() as u32)
    }

    #[inline]
    fn data(&self) -> &[u8] {
        self.data
    }
}

/// Maps a LINKTYPE_* value from a capture header onto the frame layouts the
/// locator walks
pub fn link_type_from_pcap(linktype: Linktype) -> Option<LinkType> {
    match linktype.0 {
        0 => Some(LinkType::Null), // LINKTYPE_NULL
        1 => Some(LinkType::Ethernet), // LINKTYPE_ETHERNET
        12 | 101 => Some(LinkType::RawIpv4), // LINKTYPE_RAW, either IP version
        108 => Some(LinkType::Null), // LINKTYPE_LOOP
        113 => Some(LinkType::Sll), // LINKTYPE_LINUX_SLL
        228 => Some(LinkType::RawIpv4), // LINKTYPE_IPV4
        229 => Some(LinkType::RawIpv6), // LINKTYPE_IPV6
        276 => Some(LinkType::Sllv2), // LINKTYPE_LINUX_SLL2
        _ => None,
    }
}
