//! TSID Generator
//!
//! Time-sorted identifiers encoded as 13-character Crockford Base32 strings.

use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicU16, Ordering};

/// Crockford Base32 alphabet (excludes I, L, O, U)
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

static COUNTER: AtomicU16 = AtomicU16::new(0);

pub struct TsidGenerator;

impl TsidGenerator {
    /// 42 bits of milliseconds, 10 random bits, 12 counter bits.
    pub fn generate() -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst) as u64;
        let random: u64 = rand::rng().random_range(0..1024);

        let tsid = ((now & 0x3FF_FFFF_FFFF) << 22) | (random << 12) | (counter & 0xFFF);
        encode_crockford(tsid)
    }

    /// Identifier with a readable prefix, e.g. `rb-0HZXEQ5Y8JY5Z`.
    pub fn prefixed(prefix: &str) -> String {
        format!("{}-{}", prefix, Self::generate())
    }
}

fn encode_crockford(value: u64) -> String {
    (0..13)
        .rev()
        .map(|i| ALPHABET[((value >> (i * 5)) & 0x1F) as usize] as char)
        .collect()
}
