use clap::Parser;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::*;
use sctp_strata::packet::frame::LinkType;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

mod packet_metadata;
mod process;
mod stats;

use packet_metadata::link_type_from_pcap;
use process::ProcessOptions;

#[derive(Parser, Debug)]
#[command(name = "sctp-reader")]
#[command(about = "Decode the SCTP packets of a PCAP/PCAPNG capture", long_about = None)]
struct Args {
    /// Path to the PCAP file to read
    #[arg(short, long, value_name = "FILE")]
    pcap: PathBuf,

    /// dump every SCTP packet with its chunks
    #[arg(short, long)]
    dump_packet: bool,

    /// do not decode chunk parameters
    #[arg(short, long)]
    lazy: bool,

    /// only packets with this source or destination port
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// verify the CRC32c checksum of every SCTP packet
    #[arg(short, long)]
    checksum: bool,

    /// print statistics at the end
    #[arg(short, long)]
    stats: bool,
}

impl Args {
    fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            dump_packet: self.dump_packet,
            lazy: self.lazy,
            port: self.port,
            verify_checksum: self.checksum,
        }
    }
}

fn main() {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let stats = stats::Stats::default();

    info!("Reading PCAP file: {:?}", args.pcap);
    if let Err(e) = process_pcap(&args.pcap, &args.process_options(), &stats) {
        error!("Failed to process PCAP file: {}", e);
        std::process::exit(1);
    }
    if args.stats {
        println!("{stats}");
    }
    info!("PCAP processing completed!");
}

fn set_link_type(link_type: &mut Option<LinkType>, linktype: Linktype) {
    *link_type = link_type_from_pcap(linktype);
    match link_type {
        Some(lt) => info!("Link type {:?} ({:?})", lt, linktype),
        None => warn!("Unsupported link type {:?}, guessing from the first packet", linktype),
    }
}

#[inline]
fn emit(dump: Option<String>) {
    if let Some(dump) = dump {
        print!("{dump}");
    }
}

/// Process PCAP file packet by packet
fn process_pcap(pcap_path: &Path, options: &ProcessOptions, stats: &stats::Stats) -> Result<(), String> {
    let mut local_stats = stats::LocalStats::new();

    let open = || File::open(pcap_path).map_err(|e| format!("Failed to open {:?}: {}", pcap_path, e));

    let mut packet_count: u64 = 0;
    let mut bytes_count: u64 = 0;

    let start = std::time::Instant::now();

    let mut link_type: Option<LinkType> = None;

    // Try to create a PCAPNG reader first
    match PcapNGReader::new(65536, open()?) {
        Ok(mut reader) => {
            info!("Detected PCAPNG format");
            loop {
                match reader.next() {
                    Ok((offset, block)) => {
                        match block {
                            PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
                                packet_count += 1;
                                bytes_count += epb.caplen as u64;
                                emit(process::process_packet(packet_count, &mut link_type, &epb, &mut local_stats, stats, options));
                            }
                            PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                                packet_count += 1;
                                bytes_count += spb.origlen as u64;
                                emit(process::process_packet(packet_count, &mut link_type, &spb, &mut local_stats, stats, options));
                            }
                            PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                                // a single link type is assumed per capture
                                set_link_type(&mut link_type, idb.linktype);
                            }
                            _ => {}
                        }
                        reader.consume(offset);
                    }
                    Err(PcapError::Eof) => break,
                    Err(PcapError::Incomplete(_)) => {
                        reader
                            .refill()
                            .map_err(|e| format!("Error refilling PCAPNG buffer: {:?}", e))?;
                    }
                    Err(e) => {
                        return Err(format!("Error reading PCAPNG: {:?}", e));
                    }
                }
            }
        }
        Err(_) => {
            // Try legacy PCAP format
            let mut reader = LegacyPcapReader::new(65536, open()?)
                .map_err(|e| format!("Failed to create PCAP reader: {:?}", e))?;

            loop {
                match reader.next() {
                    Ok((offset, block)) => {
                        match block {
                            PcapBlockOwned::Legacy(packet) => {
                                packet_count += 1;
                                bytes_count += packet.caplen as u64;
                                emit(process::process_packet(packet_count, &mut link_type, &packet, &mut local_stats, stats, options));
                            }
                            PcapBlockOwned::LegacyHeader(header) => {
                                set_link_type(&mut link_type, header.network);
                            }
                            _ => {}
                        }
                        reader.consume(offset);
                    }
                    Err(PcapError::Eof) => break,
                    Err(PcapError::Incomplete(_)) => {
                        reader
                            .refill()
                            .map_err(|e| format!("Error refilling PCAP buffer: {:?}", e))?;
                    }
                    Err(e) => {
                        return Err(format!("Error reading PCAP: {:?}", e));
                    }
                }
            }
        }
    }

    // Final flush of local stats
    local_stats.flush(stats);

    info!(
        "Total packets processed: {}, {:.3}M pkt/sec, {:.3} Gbps",
        packet_count,
        (packet_count as f64 / start.elapsed().as_secs_f64()) / 1_000_000.0,
        (bytes_count as f64 * 8.0) / (start.elapsed().as_secs_f64() * 1_000_000_000.0)
    );
    Ok(())
}
