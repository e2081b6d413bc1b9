use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

use sctp_strata::packet::sctp::{Chunk, ChunkAreaStatus};
use sctp_strata::packet::PacketHeaderError;

// Declares the local counters, their atomic mirror and the flush between them
macro_rules! counters {
    ($( $(#[$doc:meta])* $field:ident ),+ $(,)?) => {
        /// Per-reader packet counters
        ///
        /// These counters avoid atomic operations on every packet by accumulating
        /// counts locally and periodically flushing to the shared `Stats` struct.
        #[derive(Default, Debug, Clone)]
        pub struct LocalStats {
            $( $(#[$doc])* pub $field: u64, )+
        }

        #[derive(Default, Debug)]
        pub struct Stats {
            $( $(#[$doc])* pub $field: AtomicU64, )+
        }

        impl LocalStats {
            /// Flush all local counters to the shared atomic stats and reset them
            #[inline]
            pub fn flush(&mut self, stats: &Stats) {
                $(
                    if self.$field > 0 {
                        stats.$field.fetch_add(self.$field, Ordering::Relaxed);
                        self.$field = 0;
                    }
                )+
            }
        }
    };
}

counters! {
    total_packets,
    total_bytes,

    /// Frames carrying SCTP
    sctp,
    /// Other traffic and IP fragments
    not_sctp,
    /// SCTP packets dropped by the port filter
    filtered,

    // Errors walking link and network headers
    too_small,
    invalid,
    insufficient_len,

    /// SCTP payloads shorter than the common header
    sctp_too_short,
    bad_checksum,

    // How chunk areas ended
    trailing_bytes,
    bad_chunk_length,
    truncated_chunk,

    // Chunks by type
    data,
    init,
    init_ack,
    sack,
    heartbeat,
    heartbeat_ack,
    abort,
    shutdown,
    shutdown_ack,
    error,
    cookie_echo,
    cookie_ack,
    shutdown_complete,
    other_chunks,
}

/// Flush interval for local stats (must be power of 2)
pub const FLUSH_INTERVAL: u64 = 1024;

impl LocalStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true every `interval` packets
    #[inline]
    pub fn should_flush(&self, interval: u64) -> bool {
        self.total_packets & (interval - 1) == 0
    }

    #[inline]
    pub fn count_error(&mut self, err: &PacketHeaderError) {
        match err {
            PacketHeaderError::TooShort(_) => self.too_small += 1,
            PacketHeaderError::Invalid(_) => self.invalid += 1,
            PacketHeaderError::InsufficientLength(_) => self.insufficient_len += 1,
        }
    }

    #[inline]
    pub fn count_status(&mut self, status: ChunkAreaStatus) {
        match status {
            ChunkAreaStatus::Complete => {}
            ChunkAreaStatus::TrailingBytes { .. } => self.trailing_bytes += 1,
            ChunkAreaStatus::BadChunkLength { .. } => self.bad_chunk_length += 1,
            ChunkAreaStatus::Truncated { .. } => self.truncated_chunk += 1,
        }
    }

    #[inline]
    pub fn count_chunk(&mut self, chunk: &Chunk<'_>) {
        match chunk {
            Chunk::Data(_) => self.data += 1,
            Chunk::Init(_) => self.init += 1,
            Chunk::InitAck(_) => self.init_ack += 1,
            Chunk::Sack(_) => self.sack += 1,
            Chunk::Heartbeat(_) => self.heartbeat += 1,
            Chunk::HeartbeatAck(_) => self.heartbeat_ack += 1,
            Chunk::Abort(_) => self.abort += 1,
            Chunk::Shutdown(_) => self.shutdown += 1,
            Chunk::ShutdownAck(_) => self.shutdown_ack += 1,
            Chunk::Error(_) => self.error += 1,
            Chunk::CookieEcho(_) => self.cookie_echo += 1,
            Chunk::CookieAck(_) => self.cookie_ack += 1,
            Chunk::ShutdownComplete(_) => self.shutdown_complete += 1,
            Chunk::Generic(_) => self.other_chunks += 1,
        }
    }
}

impl Stats {
    /// Get the value of a counter using relaxed ordering
    #[inline]
    fn get(&self, counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.get(&self.too_small)
            + self.get(&self.invalid)
            + self.get(&self.insufficient_len)
    }

    pub fn total_chunks(&self) -> u64 {
        [
            &self.data,
            &self.init,
            &self.init_ack,
            &self.sack,
            &self.heartbeat,
            &self.heartbeat_ack,
            &self.abort,
            &self.shutdown,
            &self.shutdown_ack,
            &self.error,
            &self.cookie_echo,
            &self.cookie_ack,
            &self.shutdown_complete,
            &self.other_chunks,
        ]
        .into_iter()
        .map(|c| self.get(c))
        .sum()
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SCTP Statistics ===")?;
        writeln!(f)?;

        writeln!(f, "--- General ---")?;
        writeln!(f, "Total packets processed: {}", self.get(&self.total_packets))?;
        writeln!(f, "Total bytes processed: {}", self.get(&self.total_bytes))?;
        writeln!(f, "SCTP packets: {}", self.get(&self.sctp))?;
        writeln!(f, "Non-SCTP or fragmented: {}", self.get(&self.not_sctp))?;
        writeln!(f, "Filtered by port: {}", self.get(&self.filtered))?;
        writeln!(f)?;

        writeln!(f, "--- Errors ---")?;
        writeln!(f, "Header errors: {}", self.total_errors())?;
        writeln!(f, "  Too small: {}", self.get(&self.too_small))?;
        writeln!(f, "  Invalid: {}", self.get(&self.invalid))?;
        writeln!(f, "  Insufficient length: {}", self.get(&self.insufficient_len))?;
        writeln!(f, "SCTP too short: {}", self.get(&self.sctp_too_short))?;
        writeln!(f, "Bad checksum: {}", self.get(&self.bad_checksum))?;
        writeln!(f)?;

        writeln!(f, "--- Chunk Areas ---")?;
        writeln!(f, "Trailing bytes: {}", self.get(&self.trailing_bytes))?;
        writeln!(f, "Bad chunk length: {}", self.get(&self.bad_chunk_length))?;
        writeln!(f, "Truncated chunk: {}", self.get(&self.truncated_chunk))?;
        writeln!(f)?;

        writeln!(f, "--- Chunks ---")?;
        writeln!(f, "Total chunks: {}", self.total_chunks())?;
        let by_type = [
            ("DATA", &self.data),
            ("INIT", &self.init),
            ("INIT ACK", &self.init_ack),
            ("SACK", &self.sack),
            ("HEARTBEAT", &self.heartbeat),
            ("HEARTBEAT ACK", &self.heartbeat_ack),
            ("ABORT", &self.abort),
            ("SHUTDOWN", &self.shutdown),
            ("SHUTDOWN ACK", &self.shutdown_ack),
            ("ERROR", &self.error),
            ("COOKIE ECHO", &self.cookie_echo),
            ("COOKIE ACK", &self.cookie_ack),
            ("SHUTDOWN COMPLETE", &self.shutdown_complete),
            ("Other", &self.other_chunks),
        ];
        for (name, counter) in by_type {
            let value = self.get(counter);
            if value > 0 {
                writeln!(f, "  {}: {}", name, value)?;
            }
        }

        Ok(())
    }
}
