//! Static lookup tables used by the CEA-608 decoder: preamble-address-code row tables, the
//! translated character set, and the cue-placement tables (row-to-line, indent-to-position).
//!
//! The row and attribute lookups are static, small, and sparse, so everything here is a const
//! table or a match over a small, known domain rather than a `HashMap`.

// Row-to-line table, 1-indexed; index 0 is unused padding.
const ROW_POS: [f32; 16] = [
    0.0, 10.0, 15.33, 20.66, 26.0, 31.33, 36.66, 42.0, 47.33, 52.66, 58.0, 63.33, 68.66, 74.0,
    79.33, 84.66,
];

// Look up the line position for a row. Out-of-range rows (outside 1..=15) map to None; the
// renderer falls back to its own default.
pub fn row_pos(row: u8) -> Option<f32> {
    if (1..=15).contains(&row) {
        Some(ROW_POS[row as usize])
    } else {
        None
    }
}

// Look up the horizontal position for an indent. None (no PAC indent set yet) and any value
// outside the eight valid indents both map to None.
pub fn line_indent(indent: Option<u8>) -> Option<f32> {
    match indent? {
        0 => Some(10.0),
        4 => Some(20.0),
        8 => Some(30.0),
        12 => Some(40.0),
        16 => Some(50.0),
        20 => Some(60.0),
        24 => Some(70.0),
        28 => Some(80.0),
        _ => None,
    }
}

// Channel-1 PAC row, attribute byte in 0x40..=0x5F.
fn ch1_row_low(a: u8) -> Option<u8> {
    match a {
        0x11 => Some(1),
        0x12 => Some(3),
        0x15 => Some(5),
        0x16 => Some(7),
        0x17 => Some(9),
        0x10 => Some(11),
        0x13 => Some(12),
        0x14 => Some(14),
        _ => None,
    }
}

// Channel-1 PAC row, attribute byte in 0x60..=0x7F. 0x10 has no entry here: its only valid
// attribute-byte range is 0x40..=0x5F.
fn ch1_row_high(a: u8) -> Option<u8> {
    match a {
        0x11 => Some(2),
        0x12 => Some(4),
        0x15 => Some(6),
        0x16 => Some(8),
        0x17 => Some(10),
        0x13 => Some(13),
        0x14 => Some(15),
        _ => None,
    }
}

// Channel-2 analogue of ch1_row_low, attribute byte a in 0x18..=0x1F.
fn ch2_row_low(a: u8) -> Option<u8> {
    match a {
        0x19 => Some(1),
        0x1A => Some(3),
        0x1D => Some(5),
        0x1E => Some(7),
        0x1F => Some(9),
        0x18 => Some(11),
        0x1B => Some(12),
        0x1C => Some(14),
        _ => None,
    }
}

// Channel-2 analogue of ch1_row_high.
fn ch2_row_high(a: u8) -> Option<u8> {
    match a {
        0x19 => Some(2),
        0x1A => Some(4),
        0x1D => Some(6),
        0x1E => Some(8),
        0x1F => Some(10),
        0x1B => Some(13),
        0x1C => Some(15),
        _ => None,
    }
}

// Resolve the row a PAC's (a, b) pair selects. channel1 distinguishes the 0x10..=0x17 from the
// 0x18..=0x1F attribute-byte group; low distinguishes the 0x40..=0x5F from the 0x60..=0x7F
// sub-range (already decided by the caller from b).
pub fn pac_row(a: u8, channel1: bool, low: bool) -> Option<u8> {
    match (channel1, low) {
        (true, true) => ch1_row_low(a),
        (true, false) => ch1_row_high(a),
        (false, true) => ch2_row_low(a),
        (false, false) => ch2_row_high(a),
    }
}

// Character translation overrides. Every other printable byte in 0x20..=0x7F is emitted as its
// own Unicode code point.
fn translated_override(byte: u8) -> Option<char> {
    let ch = match byte {
        0x2A => '\u{E1}', // á
        0x5C => '\u{E9}', // é
        0x5E => '\u{ED}', // í
        0x5F => '\u{F3}', // ó
        0x60 => '\u{FA}', // ú
        0x7B => '\u{E7}', // ç
        0x7C => '\u{F7}', // ÷
        0x7D => '\u{D1}', // Ñ
        0x7E => '\u{F1}', // ñ
        0x7F => '\u{2588}', // █
        _ => return None,
    };
    Some(ch)
}

// Translate a single CEA-608 character byte into the character it writes. Applying this twice
// is a fixed point: a translated char is never itself a valid input byte in the override
// table's domain (none of the outputs round-trip back through u8).
pub fn translate_char(byte: u8) -> Option<char> {
    translated_override(byte).or_else(|| char::from_u32(byte as u32))
}
