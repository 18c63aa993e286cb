//! The CEA-608 channel-1/field-1 decoder state machine.
//!
//! [`Cea608Stream`] consumes timestamped 16-bit CEA-608 byte pairs and emits [`Event`]s: decoded
//! cues when display content changes, plus a raw byte-pair sidechannel on every processed
//! packet. Paint-on mode, field 2/channel 2 text, XDS, and the extended character tables are not
//! implemented; only pop-on and roll-up are.

pub mod pen;
pub mod tables;

use log::trace;

use crate::cc_packet::CcPacket;
use crate::event::{CueEvent, Event, EventSink, RawPairEvent};
use pen::{Pen, PacChannel};

// Control codes dispatched in Cea608Stream::push.
mod control {
    pub const PADDING: u16 = 0x0000;
    pub const RESUME_CAPTION_LOADING: u16 = 0x1420;
    pub const END_OF_CAPTION: u16 = 0x142F;
    pub const ROLL_UP_2_ROWS: u16 = 0x1425;
    pub const ROLL_UP_3_ROWS: u16 = 0x1426;
    pub const ROLL_UP_4_ROWS: u16 = 0x1427;
    pub const CARRIAGE_RETURN: u16 = 0x142D;
    pub const BACKSPACE: u16 = 0x1421;
    pub const ERASE_DISPLAYED_MEMORY: u16 = 0x142C;
    pub const ERASE_NON_DISPLAYED_MEMORY: u16 = 0x142E;
    pub const TAB_OFFSET_1: u16 = 0x1721;
    pub const TAB_OFFSET_2: u16 = 0x1722;
    pub const TAB_OFFSET_3: u16 = 0x1723;
}

// The bottom row index of both display buffers.
const BOTTOM_ROW: usize = 14;
const ROW_COUNT: usize = 15;

/// Decoder presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    PopOn,
    RollUp { top_row: u8, row_offset: u8 },
}

fn empty_rows() -> [String; ROW_COUNT] {
    std::array::from_fn(|_| String::new())
}

/// A single-channel CEA-608 decoder.
///
/// Holds two 15-row text buffers (`displayed` / `non_displayed`), a [`Mode`], and the current
/// [`Pen`]. State is retained across `push` calls until the instance is dropped or explicitly
/// [`reset`](Cea608Stream::reset); there is no implicit reset at `flush`.
#[derive(Debug)]
pub struct Cea608Stream {
    mode: Mode,
    displayed: [String; ROW_COUNT],
    non_displayed: [String; ROW_COUNT],
    start_pts: i64,
    last_control_code: Option<u16>,
    last_pac: Option<(u8, u8)>,
    pen: Pen,
}

impl Default for Cea608Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl Cea608Stream {
    pub fn new() -> Self {
        Cea608Stream {
            mode: Mode::PopOn,
            displayed: empty_rows(),
            non_displayed: empty_rows(),
            start_pts: 0,
            last_control_code: None,
            last_pac: None,
            pen: Pen::default(),
        }
    }

    /// Discard all retained state and return to the initial pop-on, all-empty-rows state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // Process one CC packet. Packets with field_type != 0 (not NTSC field 1) never influence
    // decoder output.
    pub fn push(&mut self, packet: CcPacket, sink: &mut impl EventSink) {
        if packet.field_type != 0 {
            return;
        }

        let data = packet.cc_data & 0x7F7F;
        trace!("cc608 byte-pair {data:#06x} pts={}", packet.pts);

        if self.last_control_code == Some(data) {
            self.last_control_code = None;
            return;
        }
        if data & 0xF000 == 0x1000 {
            self.last_control_code = Some(data);
        } else {
            self.last_control_code = None;
        }

        self.force_flush(data, packet.pts, sink);

        let a = (data >> 8) as u8;
        let b = (data & 0xFF) as u8;
        let is_pac =
            (0x10..=0x17).contains(&a) && (0x40..=0x7F).contains(&b) && !(a == 0x10 && b < 0x60);
        if !is_pac {
            // A PAC repeated immediately is absorbed into a single pen update
            // (`self.last_pac`, set in `apply_pac`); anything else in between re-arms it.
            self.last_pac = None;
        }

        match data {
            control::PADDING => {}
            control::RESUME_CAPTION_LOADING => self.mode = Mode::PopOn,
            control::END_OF_CAPTION => {
                // Pop-on: the buffer built up since the last EOC is what's popping onto the
                // screen now, so swap into `displayed` before flushing, not after.
                std::mem::swap(&mut self.displayed, &mut self.non_displayed);
                self.flush_displayed(sink, packet.pts);
                self.start_pts = packet.pts;
            }
            control::ROLL_UP_2_ROWS => {
                self.mode = Mode::RollUp {
                    top_row: 13,
                    row_offset: 1,
                }
            }
            control::ROLL_UP_3_ROWS => {
                self.mode = Mode::RollUp {
                    top_row: 12,
                    row_offset: 2,
                }
            }
            control::ROLL_UP_4_ROWS => {
                self.mode = Mode::RollUp {
                    top_row: 11,
                    row_offset: 3,
                }
            }
            control::CARRIAGE_RETURN => {
                self.flush_displayed(sink, packet.pts);
                self.shift_rows_up();
                self.start_pts = packet.pts;
            }
            control::BACKSPACE => {
                let row = match self.mode {
                    Mode::PopOn => &mut self.non_displayed[BOTTOM_ROW],
                    Mode::RollUp { .. } => &mut self.displayed[BOTTOM_ROW],
                };
                row.pop();
            }
            control::ERASE_DISPLAYED_MEMORY => {
                self.flush_displayed(sink, packet.pts);
                self.displayed = empty_rows();
            }
            control::ERASE_NON_DISPLAYED_MEMORY => {
                self.non_displayed = empty_rows();
            }
            control::TAB_OFFSET_1 | control::TAB_OFFSET_2 | control::TAB_OFFSET_3 => {}
            _ => self.handle_character_or_pac(a, b, is_pac, packet.pts),
        }
    }

    // Cea608Stream processes every packet immediately and retains its display buffers across
    // pushes, so there is nothing to drain here beyond satisfying the push/flush contract
    // CaptionStream relies on.
    pub fn flush(&mut self, _sink: &mut impl EventSink) {}

    // Unconditionally emit the raw byte pair on every processed packet, except when both bytes
    // are zero.
    fn force_flush(&self, data: u16, pts: i64, sink: &mut impl EventSink) {
        let b0 = (data >> 8) as u8;
        let b1 = (data & 0xFF) as u8;
        if b0 == 0 && b1 == 0 {
            return;
        }
        sink.emit(Event::RawPair(RawPairEvent {
            pts,
            cea608: [b0, b1],
        }));
    }

    // PAC detection, musical-note special case, unsupported-control-range filtering, null
    // normalization, then dispatch to the current mode's writer.
    fn handle_character_or_pac(&mut self, a: u8, b: u8, is_pac: bool, pts: i64) {
        let (out0, out1) = if is_pac {
            self.apply_pac(a, b);
            (Some(' '), None)
        } else if (a == 0x11 || a == 0x19) && (0x30..=0x3F).contains(&b) {
            (Some('\u{266A}'), None)
        } else if a & 0xF0 == 0x10 {
            return;
        } else {
            let a_opt = if a == 0 { None } else { Some(a) };
            let b_opt = if b == 0 { None } else { Some(b) };
            (
                a_opt.and_then(tables::translate_char),
                b_opt.and_then(tables::translate_char),
            )
        };

        self.write_chars(out0, out1, pts);
    }

    // Parse and apply a PAC, suppressing an immediately-repeated one beyond its first pen
    // update. Channel-2 PACs still arm the repeat-suppression window but never touch the
    // channel-1 pen this decoder tracks.
    fn apply_pac(&mut self, a: u8, b: u8) {
        let Some((channel, pen)) = pen::parse_pac(a, b) else {
            return;
        };

        if self.last_pac != Some((a, b)) && channel == PacChannel::One {
            self.pen = pen;
        }
        self.last_pac = Some((a, b));
    }

    // Pop-on and roll-up mode writers. Both record `start_pts` the moment their target row
    // transitions from empty to non-empty: for pop-on that's the non-displayed buffer, since
    // it's what becomes `displayed` at the next END_OF_CAPTION.
    fn write_chars(&mut self, c0: Option<char>, c1: Option<char>, pts: i64) {
        match self.mode {
            Mode::PopOn => {
                if self.non_displayed[BOTTOM_ROW].is_empty() {
                    self.start_pts = pts;
                }
                let row = &mut self.non_displayed[BOTTOM_ROW];
                if let Some(c) = c0 {
                    row.push(c);
                }
                if let Some(c) = c1 {
                    row.push(c);
                }
            }
            Mode::RollUp { .. } => {
                if self.displayed[BOTTOM_ROW].is_empty() {
                    self.start_pts = pts;
                }
                let row = &mut self.displayed[BOTTOM_ROW];
                if let Some(c) = c0 {
                    row.push(c);
                }
                if let Some(c) = c1 {
                    row.push(c);
                }
            }
        }
    }

    // Clear above top_row, shift top_row..BOTTOM_ROW up by one, clear the bottom row. A no-op
    // outside roll-up mode.
    fn shift_rows_up(&mut self) {
        let Mode::RollUp { top_row, .. } = self.mode else {
            return;
        };
        let top_row = top_row as usize;
        for row in self.displayed.iter_mut().take(top_row) {
            row.clear();
        }
        for i in top_row..BOTTOM_ROW {
            self.displayed[i] = std::mem::take(&mut self.displayed[i + 1]);
        }
        self.displayed[BOTTOM_ROW].clear();
    }

    // Trim each row, drop empties, join with '\n', and emit a cue if anything survived.
    fn flush_displayed(&mut self, sink: &mut impl EventSink, end_pts: i64) {
        let mut lines = Vec::with_capacity(ROW_COUNT);
        for row in &self.displayed {
            let trimmed = row.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        if lines.is_empty() {
            return;
        }

        let rows_in_cue = lines.len() as u8;
        let text = lines.join("\n");
        // A single-line cue's line number equals its own row; an N-line cue's topmost line sits
        // N - 1 rows above pen.row.
        let line = self
            .pen
            .row
            .checked_sub(rows_in_cue.saturating_sub(1))
            .and_then(tables::row_pos);
        let position = tables::line_indent(self.pen.indent);

        sink.emit(Event::Cue(CueEvent {
            start_pts: self.start_pts,
            end_pts,
            text,
            line,
            align: "start",
            position,
            position_align: "start",
            size: 80,
            snap_to_lines: false,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_all(decoder: &mut Cea608Stream, pairs: &[(i64, u16)], sink: &mut Vec<Event>) {
        for &(pts, cc_data) in pairs {
            decoder.push(
                CcPacket {
                    field_type: 0,
                    pts,
                    cc_data,
                },
                sink,
            );
        }
    }

    fn only_cues(events: Vec<Event>) -> Vec<CueEvent> {
        events
            .into_iter()
            .filter_map(|e| match e {
                Event::Cue(cue) => Some(cue),
                Event::RawPair(_) => None,
            })
            .collect()
    }

    #[test]
    fn pop_on_hi() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(
            &mut decoder,
            &[
                (1000, control::RESUME_CAPTION_LOADING),
                (1000, 0x4800), // 'H' + null
                (1000, 0x4900), // 'I' + null
                (2000, control::END_OF_CAPTION),
            ],
            &mut sink,
        );
        let cues = only_cues(sink);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start_pts, 1000);
        assert_eq!(cues[0].end_pts, 2000);
        assert_eq!(cues[0].text, "HI");
    }

    #[test]
    fn roll_up_2_hello_then_cr() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(
            &mut decoder,
            &[
                (500, control::ROLL_UP_2_ROWS),
                (500, 0x1470), // PAC row 15, idx=0x10 -> indent 0 (high range, actually detected)
                (500, ((b'H' as u16) << 8) | b'E' as u16),
                (500, ((b'L' as u16) << 8) | b'L' as u16),
                (500, 0x4F00), // 'O' + null
                (900, control::CARRIAGE_RETURN),
            ],
            &mut sink,
        );
        let cues = only_cues(sink);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "HELLO");
        assert_eq!(cues[0].line, Some(84.66));
        assert_eq!(cues[0].position, Some(10.0));
        assert_eq!(decoder.displayed[BOTTOM_ROW], "");
    }

    #[test]
    fn backspace_drops_last_char_in_pop_on() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(
            &mut decoder,
            &[
                (0, ((b'A' as u16) << 8) | b'B' as u16),
                (0, control::BACKSPACE),
            ],
            &mut sink,
        );
        assert_eq!(decoder.non_displayed[BOTTOM_ROW], "A");
    }

    #[test]
    fn erase_displayed_memory_flushes_then_clears() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(
            &mut decoder,
            &[
                (0, control::ROLL_UP_2_ROWS),
                (0, ((b'H' as u16) << 8) | b'I' as u16),
                (100, control::ERASE_DISPLAYED_MEMORY),
            ],
            &mut sink,
        );
        let cues = only_cues(sink);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "HI");
        assert!(decoder.displayed.iter().all(String::is_empty));
    }

    #[test]
    fn musical_note_writes_single_char() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(&mut decoder, &[(0, 0x1137)], &mut sink);
        assert_eq!(decoder.non_displayed[BOTTOM_ROW], "\u{266A}");
    }

    #[test]
    fn duplicate_control_code_suppressed() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(
            &mut decoder,
            &[
                (1000, control::RESUME_CAPTION_LOADING),
                (1000, ((b'H' as u16) << 8) | b'I' as u16),
                (2000, control::END_OF_CAPTION),
                (2000, control::END_OF_CAPTION), // duplicate, same pts: absorbed
            ],
            &mut sink,
        );
        let cues = only_cues(sink);
        assert_eq!(cues.len(), 1);
    }

    #[test]
    fn translation_table_applied_in_decoder() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(&mut decoder, &[(0, 0x2A00)], &mut sink);
        assert_eq!(decoder.non_displayed[BOTTOM_ROW], "\u{E1}");
    }

    #[test]
    fn field_type_other_than_zero_is_ignored() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        decoder.push(
            CcPacket {
                field_type: 1,
                pts: 0,
                cc_data: ((b'A' as u16) << 8) | b'B' as u16,
            },
            &mut sink,
        );
        assert!(decoder.non_displayed[BOTTOM_ROW].is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn raw_pair_sidechannel_emitted_for_every_nonzero_packet() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(&mut decoder, &[(42, ((b'A' as u16) << 8) | b'B' as u16)], &mut sink);
        assert!(sink
            .iter()
            .any(|e| matches!(e, Event::RawPair(p) if p.pts == 42 && p.cea608 == [b'A', b'B'])));
    }

    #[test]
    fn padding_emits_no_raw_pair() {
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(&mut decoder, &[(0, control::PADDING)], &mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn repeated_pac_is_absorbed_into_one_pen_update() {
        // A third transmission of the identical PAC bytes (the first two already collapsed by
        // the generic duplicate-control-code suppression in `push`) must not be treated as a
        // fresh command either -- it's still the same caption still loading.
        let mut decoder = Cea608Stream::new();
        let mut sink = Vec::new();
        push_all(
            &mut decoder,
            &[
                (0, 0x1470), // PAC row 15, indent 0 -- sets last_control_code
                (0, 0x1470), // identical repeat -- absorbed, last_control_code cleared
                (0, 0x1470), // third transmission -- absorbed by last_pac, not a new PAC event
            ],
            &mut sink,
        );
        assert_eq!(decoder.pen.row, 15);
        assert_eq!(decoder.pen.indent, Some(0));
    }
}
