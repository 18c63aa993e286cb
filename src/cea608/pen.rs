//! Pen / preamble-address-code state.
//!
//! A single value type plus a pure parser with no access to decoder state, so PAC parsing stays
//! a function of `(a, b)` alone.

use super::tables;

/// One of the seven CEA-608 text colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Green,
    Blue,
    Cyan,
    Red,
    Yellow,
    Magenta,
}

// color = [white, green, blue, cyan, red, yellow, magenta, white][idx/2]. The trailing white
// is never actually reachable (idx <= 0x0D caps idx/2 at 6) but is kept for fidelity to the
// full table.
const COLOR_TABLE: [Color; 8] = [
    Color::White,
    Color::Green,
    Color::Blue,
    Color::Cyan,
    Color::Red,
    Color::Yellow,
    Color::Magenta,
    Color::White,
];

/// The full pen/PAC state a decoder tracks for its current row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Option<Color>,
    pub italics: bool,
    pub underline: bool,
    pub indent: Option<u8>,
    pub row: u8,
}

impl Default for Pen {
    fn default() -> Self {
        Pen {
            color: None,
            italics: false,
            underline: false,
            indent: None,
            row: 15,
        }
    }
}

/// Which channel a parsed PAC targets. Channel 2 PACs are parsed (so the repeated-PAC
/// suppression window still applies to them) but never update the channel-1 [`Pen`] this
/// crate's single-channel decoder tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacChannel {
    One,
    Two,
}

/// Parse a two-byte preamble address code.
///
/// Returns `None` if `(a, b)` is not a valid PAC. On success, returns the channel it targets
/// and the [`Pen`] state it selects.
pub fn parse_pac(a: u8, b: u8) -> Option<(PacChannel, Pen)> {
    let (channel1, low) = match (a, b) {
        (0x11..=0x17, 0x40..=0x7F) => (true, b <= 0x5F),
        (0x19..=0x1F, 0x40..=0x7F) => (false, b <= 0x5F),
        (0x10, 0x40..=0x5F) => (true, true),
        (0x18, 0x40..=0x5F) => (false, true),
        _ => return None,
    };

    let row = tables::pac_row(a, channel1, low)?;
    let channel = if channel1 {
        PacChannel::One
    } else {
        PacChannel::Two
    };

    let idx = if b > 0x5F { b - 0x60 } else { b - 0x40 };
    let underline = idx & 1 != 0;

    let mut pen = Pen {
        row,
        underline,
        ..Pen::default()
    };

    if idx <= 0x0D {
        pen.color = Some(COLOR_TABLE[(idx / 2) as usize]);
        pen.italics = false;
        pen.indent = None;
    } else if idx <= 0x0F {
        pen.italics = true;
        pen.color = Some(Color::White);
        pen.indent = None;
    } else {
        pen.indent = Some(((idx - 0x10) / 2) * 4);
    }

    Some((channel, pen))
}
