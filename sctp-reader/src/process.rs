use sctp_strata::packet::frame::{guess_link_type, locate_sctp, LinkType};
use sctp_strata::packet::sctp::SctpLayer;
use tracing::{debug, trace};

use crate::packet_metadata::PacketMetadata;
use crate::stats::{LocalStats, Stats, FLUSH_INTERVAL};

/// Per-packet switches taken from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    pub dump_packet: bool,
    pub lazy: bool,
    pub port: Option<u16>,
    pub verify_checksum: bool,
}

/// Locates and decodes the SCTP packet inside a captured frame and updates the
/// counters.
///
/// `packet_num` is the position of the packet in the capture. The link type is
/// guessed from the first frame if the capture did not provide a usable one.
///
/// Returns the dump of the packet when `dump_packet` is set and the frame carried
/// SCTP that passed the port filter.
#[inline]
pub fn process_packet<Pkt: PacketMetadata>(
    packet_num: u64,
    link_type: &mut Option<LinkType>,
    pkt: &Pkt,
    local_stats: &mut LocalStats,
    stats: &Stats,
    options: &ProcessOptions,
) -> Option<String> {
    local_stats.total_packets += 1;
    local_stats.total_bytes += pkt.caplen() as u64;

    let link_type = *link_type.get_or_insert_with(|| guess_link_type(pkt.data()));

    let dump = decode_sctp(packet_num, link_type, pkt, local_stats, options);

    // Periodic flush to shared stats
    if local_stats.should_flush(FLUSH_INTERVAL) {
        local_stats.flush(stats);
    }

    dump
}

fn decode_sctp<Pkt: PacketMetadata>(
    packet_num: u64,
    link_type: LinkType,
    pkt: &Pkt,
    local_stats: &mut LocalStats,
    options: &ProcessOptions,
) -> Option<String> {
    let frame = match locate_sctp(pkt.data(), link_type) {
        Ok(Some(frame)) => frame,
        Ok(None) => {
            local_stats.not_sctp += 1;
            return None;
        }
        Err(e) => {
            trace!(packet = packet_num, error = %e, "frame not decoded");
            local_stats.count_error(&e);
            return None;
        }
    };

    let mut layer = match SctpLayer::new(frame.payload) {
        Ok(layer) => layer,
        Err(e) => {
            debug!(packet = packet_num, error = %e, "SCTP payload too short");
            local_stats.sctp_too_short += 1;
            return None;
        }
    };

    if let Some(port) = options.port {
        if layer.src_port() != port && layer.dst_port() != port {
            local_stats.filtered += 1;
            return None;
        }
    }

    local_stats.sctp += 1;
    local_stats.count_status(layer.status());
    for chunk in layer.chunks() {
        local_stats.count_chunk(chunk);
    }

    if options.verify_checksum && !layer.verify_checksum() {
        debug!(
            packet = packet_num,
            checksum = layer.checksum(),
            "SCTP checksum mismatch"
        );
        local_stats.bad_checksum += 1;
    }

    if !options.lazy {
        layer.parse_chunk_data();
    }

    if !options.dump_packet {
        return None;
    }

    let summary = if options.lazy {
        layer.to_string()
    } else {
        layer.render()
    };

    let mut dump = format!(
        "{:>5}   {} {} -> {} ({} bytes)\n        {}\n",
        packet_num,
        pkt.timestamp(),
        frame.src,
        frame.dst,
        pkt.data().len(),
        summary
    );
    for chunk in layer.chunks() {
        dump.push_str(&format!("          {chunk}\n"));
    }
    if !layer.status().is_complete() {
        dump.push_str(&format!("          ({})\n", layer.status()));
    }
    Some(dump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcap_parser::LegacyPcapBlock;
    use std::sync::atomic::Ordering;

    // IPv4 + SCTP common header + COOKIE ACK
    fn sctp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
        let mut frame = vec![
            0x45, 0x00, 0x00, 0x24, // IPv4, IHL 5, total length 36
            0x00, 0x01, 0x40, 0x00, // id 1, don't fragment
            0x40, 0x84, 0x00, 0x00, // TTL 64, protocol SCTP
            10, 0, 0, 1, // source
            10, 0, 0, 2, // destination
        ];
        frame.extend_from_slice(&src_port.to_be_bytes());
        frame.extend_from_slice(&dst_port.to_be_bytes());
        frame.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0]); // vtag, checksum
        frame.extend_from_slice(&[0x0B, 0x00, 0x00, 0x04]); // COOKIE ACK
        frame
    }

    fn block(data: &[u8]) -> LegacyPcapBlock<'_> {
        LegacyPcapBlock {
            ts_sec: 1_700_000_000,
            ts_usec: 0,
            caplen: data.len() as u32,
            origlen: data.len() as u32,
            data,
        }
    }

    #[test]
    fn test_dump_numbers_survive_flush() {
        let stats = Stats::default();
        let mut local_stats = LocalStats::new();
        let mut link_type = Some(LinkType::RawIpv4);
        let options = ProcessOptions {
            dump_packet: true,
            ..Default::default()
        };

        let frame = sctp_frame(2905, 2905);
        let mut last = None;
        for packet_num in 1..=FLUSH_INTERVAL + 1 {
            last = process_packet(
                packet_num,
                &mut link_type,
                &block(&frame),
                &mut local_stats,
                &stats,
                &options,
            );
        }

        let dump = last.unwrap();
        assert!(dump.starts_with(" 1025   "), "{dump}");
        assert!(dump.contains("10.0.0.1 -> 10.0.0.2"));
        assert!(dump.contains("cookie-ack len=4"));

        local_stats.flush(&stats);
        assert_eq!(stats.total_packets.load(Ordering::Relaxed), 1025);
        assert_eq!(stats.sctp.load(Ordering::Relaxed), 1025);
        assert_eq!(stats.cookie_ack.load(Ordering::Relaxed), 1025);
    }

    #[test]
    fn test_port_filter() {
        let stats = Stats::default();
        let mut local_stats = LocalStats::new();
        let mut link_type = Some(LinkType::RawIpv4);
        let options = ProcessOptions {
            dump_packet: true,
            port: Some(3868),
            ..Default::default()
        };

        let other = sctp_frame(2905, 2905);
        let diameter = sctp_frame(40000, 3868);

        let dump = process_packet(1, &mut link_type, &block(&other), &mut local_stats, &stats, &options);
        assert!(dump.is_none());
        let dump = process_packet(2, &mut link_type, &block(&diameter), &mut local_stats, &stats, &options);
        assert!(dump.is_some());

        assert_eq!(local_stats.filtered, 1);
        assert_eq!(local_stats.sctp, 1);
        assert_eq!(local_stats.cookie_ack, 1);
    }

    #[test]
    fn test_non_sctp_and_errors_are_counted() {
        let stats = Stats::default();
        let mut local_stats = LocalStats::new();
        let mut link_type = Some(LinkType::RawIpv4);
        let options = ProcessOptions::default();

        let mut udp = sctp_frame(53, 53);
        udp[9] = 17;
        assert!(process_packet(1, &mut link_type, &block(&udp), &mut local_stats, &stats, &options).is_none());
        assert!(process_packet(2, &mut link_type, &block(&udp[..10]), &mut local_stats, &stats, &options).is_none());

        assert_eq!(local_stats.not_sctp, 1);
        assert_eq!(local_stats.too_small, 1);
        assert_eq!(local_stats.total_packets, 2);
    }
}
