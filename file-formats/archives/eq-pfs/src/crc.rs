//! Filename hashing for PFS directory entries.
//!
//! PFS keys directory entries by a CRC-32 over the lowercased filename plus
//! a trailing NUL. The variant is the non-reflected one: polynomial
//! 0x04C11DB7 fed MSB-first, zero initial value, no final XOR. Standard
//! IEEE CRC-32 implementations produce different values, so the table is
//! built here.

const POLY: u32 = 0x04C1_1DB7;

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static TABLE: [u32; 256] = build_table();

fn update(mut crc: u32, data: &[u8]) -> u32 {
    for &b in data {
        crc = (crc << 8) ^ TABLE[(((crc >> 24) as u8) ^ b) as usize];
    }
    crc
}

/// Hashes a filename the way PFS directory entries expect.
///
/// The name is lowercased and NUL-terminated before hashing.
pub fn filename_crc(name: &str) -> u32 {
    let lowered = name.to_lowercase();
    let crc = update(0, lowered.as_bytes());
    update(crc, &[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_vectors() {
        assert_eq!(filename_crc("test"), 1_537_663_841);
        assert_eq!(filename_crc("hello world"), 2_533_725_502);
        assert_eq!(filename_crc("12345"), 742_322_399);
        assert_eq!(filename_crc("test.txt"), 2_138_351_979);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(filename_crc("TEST.TXT"), filename_crc("test.txt"));
    }
}
