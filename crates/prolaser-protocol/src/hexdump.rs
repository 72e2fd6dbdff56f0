//! Hex formatting for diagnostics.

use std::fmt::Write;

/// Bytes per hexdump row.
const ROW_LEN: usize = 16;

/// Format bytes as space separated lowercase hex pairs: `02 01 06 07 03`.
pub fn to_hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Classic offset / hex / printable dump, one row per 16 bytes.
///
/// ```text
/// 0000  02 04 0b 00 01 12 22 03                           ......".
/// ```
pub fn hexdump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(ROW_LEN).enumerate() {
        let _ = write!(out, "{:04x}  ", row * ROW_LEN);
        let mut hex = String::with_capacity(ROW_LEN * 3);
        for b in chunk {
            let _ = write!(hex, "{:02x} ", b);
        }
        let _ = write!(out, "{:<48}  ", hex);
        for &b in chunk {
            out.push(if (0x20..=0x7e).contains(&b) { b as char } else { '.' });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex_string() {
        assert_eq!(to_hex_string(&[0x02, 0x01, 0x06, 0x07, 0x03]), "02 01 06 07 03");
        assert_eq!(to_hex_string(&[]), "");
    }

    #[test]
    fn test_hexdump_rows() {
        let data: Vec<u8> = (0x41..0x41 + 20).collect();
        let dump = hexdump(&data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000  41 42"));
        assert!(lines[0].ends_with("ABCDEFGHIJKLMNOP"));
        assert!(lines[1].starts_with("0010  51 52 53 54"));
        assert!(lines[1].ends_with("QRST"));
    }

    #[test]
    fn test_hexdump_non_printable() {
        let dump = hexdump(&[0x02, 0x41, 0x03]);
        assert!(dump.trim_end().ends_with(".A."));
    }
}
