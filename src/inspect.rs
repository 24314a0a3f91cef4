//! Partition inspection views
//!
//! The `hex`, `text` and `count` modules. Each renders to a `String` so the
//! CLI only has to print it.

use std::fmt::Write as _;

/// Bytes per hex dump row
pub const HEX_ROW: usize = 16;

/// Offset, hex and ASCII columns, 16 bytes per row
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(HEX_ROW).enumerate() {
        let _ = write!(out, "{:08X}  ", row * HEX_ROW);
        for i in 0..HEX_ROW {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02X} ", b);
                }
                None => out.push_str("   "),
            }
            if i == HEX_ROW / 2 - 1 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| if is_print(b) { b as char } else { '.' }));
        out.push_str("|\n");
    }
    out
}

/// Printable ASCII as-is, common control characters escaped, the rest `.`
pub fn text_preview(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            b if is_print(b) => out.push(b as char),
            _ => out.push('.'),
        }
    }
    out
}

/// Character class counts for one partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharStats {
    pub letters: usize,
    pub digits: usize,
    pub spaces: usize,
    pub punctuation: usize,
    pub others: usize,
}

impl CharStats {
    pub fn count(bytes: &[u8]) -> Self {
        let mut stats = CharStats::default();
        for &b in bytes {
            if b.is_ascii_alphabetic() {
                stats.letters += 1;
            } else if b.is_ascii_digit() {
                stats.digits += 1;
            } else if is_space(b) {
                stats.spaces += 1;
            } else if b.is_ascii_punctuation() {
                stats.punctuation += 1;
            } else {
                stats.others += 1;
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.letters + self.digits + self.spaces + self.punctuation + self.others
    }
}

fn is_print(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Space, tab, newline, vertical tab, form feed, carriage return
fn is_space(b: u8) -> bool {
    b == b' ' || (0x09..=0x0D).contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_dump_rows() {
        let bytes: Vec<u8> = (0x41..0x41 + 18).collect();
        let dump = hex_dump(&bytes);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00000000  41 42 43 44 45 46 47 48  49 4A 4B 4C 4D 4E 4F 50  |ABCDEFGHIJKLMNOP|"
        );
        assert!(lines[1].starts_with("00000010  51 52 "));
        assert!(lines[1].ends_with("|QR|"));
    }

    #[test]
    fn test_hex_dump_empty() {
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn test_text_preview() {
        assert_eq!(text_preview(b"hi\tthere\r\n\x00\xFF"), "hi\\tthere\\r\\n..");
    }

    #[test]
    fn test_char_stats() {
        let stats = CharStats::count(b"Abc 123, ok!\n\x80");
        assert_eq!(
            stats,
            CharStats {
                letters: 5,
                digits: 3,
                spaces: 3,
                punctuation: 2,
                others: 1,
            }
        );
        assert_eq!(stats.total(), 14);
    }
}
