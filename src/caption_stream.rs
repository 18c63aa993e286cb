//! NAL-unit ingestion, SEI/user-data parsing, and PTS-ordered CC-packet buffering.

use log::debug;

use crate::cc_packet::{self, CcPacket};
use crate::cea608::Cea608Stream;
use crate::event::EventSink;
use crate::sei;
use crate::user_data;

/// Which kind of NAL unit an [`NalEvent`] carries. Only `SeiRbsp` is ever consumed; every other
/// NAL unit type (slice data, parameter sets, ...) is dropped on sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NalUnitType {
    SeiRbsp,
    Other,
}

/// One H.264 NAL-unit event. `escaped_rbsp` has already had emulation-prevention bytes removed
/// by the caller; NAL framing and de-escaping happen upstream of this crate.
#[derive(Debug, Clone, Copy)]
pub struct NalEvent<'a> {
    pub nal_unit_type: NalUnitType,
    pub escaped_rbsp: &'a [u8],
    pub pts: i64,
}

/// Buffers CC packets extracted from SEI NAL units and forwards them to a [`Cea608Stream`] in
/// stable PTS order at `flush` time. CEA-608 semantics depend on exact byte-pair order within a
/// frame, so the sort by `(pts, arrival order)` must be stable; an explicit arrival sequence
/// number is carried alongside each buffered packet so the tiebreak is total.
#[derive(Debug, Default)]
pub struct CaptionStream {
    pending: Vec<(CcPacket, u32)>,
    next_seq: u32,
}

impl CaptionStream {
    pub fn new() -> Self {
        CaptionStream {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Parse one NAL-unit event and buffer any CC packets it carries.
    ///
    /// Every stage here is silent-drop: a non-SEI NAL unit, an SEI with no T.35 payload, a T.35
    /// payload with a mismatched ATSC1 envelope, or a filler/empty caption-data body all simply
    /// contribute nothing.
    pub fn push(&mut self, event: NalEvent<'_>) {
        if event.nal_unit_type != NalUnitType::SeiRbsp {
            return;
        }

        let message = sei::parse_sei(event.escaped_rbsp);
        if !message.is_some() {
            return;
        }

        let Some(body) = user_data::parse_user_data(message.payload) else {
            debug!("SEI T.35 payload failed ATSC1 envelope validation, dropping");
            return;
        };

        for packet in cc_packet::extract_cc_packets(body, event.pts) {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.pending.push((packet, seq));
        }
    }

    /// Stable-sort buffered packets by `(pts ascending, arrival order ascending)`, forward each
    /// to `decoder`, empty the buffer, then invoke `decoder.flush`.
    ///
    /// Invoked even when the buffer is empty, so a decoder with nothing new still gets its
    /// `flush` call and can drain any residual state from prior flushes.
    pub fn flush(&mut self, decoder: &mut Cea608Stream, sink: &mut impl EventSink) {
        self.pending.sort_by(|(a, a_seq), (b, b_seq)| {
            a.pts.cmp(&b.pts).then(a_seq.cmp(b_seq))
        });

        for (packet, _) in self.pending.drain(..) {
            decoder.push(packet, sink);
        }

        decoder.flush(sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn sei_header(payload_type: u32, payload_size: u32) -> Vec<u8> {
        let mut out = Vec::new();
        let mut remaining = payload_type;
        while remaining >= 255 {
            out.push(0xFF);
            remaining -= 255;
        }
        out.push(remaining as u8);
        let mut remaining = payload_size;
        while remaining >= 255 {
            out.push(0xFF);
            remaining -= 255;
        }
        out.push(remaining as u8);
        out
    }

    fn sei_rbsp_with_cc(cc_triples: &[[u8; 3]]) -> Vec<u8> {
        let mut body = vec![0xB5, 0x00, 0x31, b'G', b'A', b'9', b'4', 0x03];
        body.push(0x40 | cc_triples.len() as u8);
        body.push(0xFF); // reserved byte cc_packet's off+2 indexing expects before the triples
        for triple in cc_triples {
            body.extend_from_slice(triple);
        }
        body.push(0x00); // trailing marker, stripped by user_data::parse_user_data

        let mut rbsp = sei_header(4, body.len() as u32);
        rbsp.extend_from_slice(&body);
        rbsp.push(0x80);
        rbsp
    }

    #[test]
    fn non_sei_nal_units_are_ignored() {
        let mut cs = CaptionStream::new();
        cs.push(NalEvent {
            nal_unit_type: NalUnitType::Other,
            escaped_rbsp: &sei_rbsp_with_cc(&[[0xFC, b'A', b'B']]),
            pts: 0,
        });
        assert_eq!(cs.pending.len(), 0);
    }

    #[test]
    fn sei_envelope_rejection_yields_no_packets() {
        // Wrong country code inside an otherwise-valid-looking T.35 body.
        let mut body = vec![0xB4, 0x00, 0x31, b'G', b'A', b'9', b'4', 0x03, 0x41, 0x00];
        let mut rbsp = sei_header(4, body.len() as u32);
        rbsp.append(&mut body);
        rbsp.push(0x80);

        let mut cs = CaptionStream::new();
        cs.push(NalEvent {
            nal_unit_type: NalUnitType::SeiRbsp,
            escaped_rbsp: &rbsp,
            pts: 0,
        });
        assert_eq!(cs.pending.len(), 0);
    }

    #[test]
    fn flush_forwards_in_pts_order_with_stable_tiebreak() {
        let mut cs = CaptionStream::new();
        cs.push(NalEvent {
            nal_unit_type: NalUnitType::SeiRbsp,
            escaped_rbsp: &sei_rbsp_with_cc(&[[0xFC, b'B', 0]]),
            pts: 2000,
        });
        cs.push(NalEvent {
            nal_unit_type: NalUnitType::SeiRbsp,
            escaped_rbsp: &sei_rbsp_with_cc(&[[0xFC, b'A', 0]]),
            pts: 1000,
        });
        cs.push(NalEvent {
            nal_unit_type: NalUnitType::SeiRbsp,
            escaped_rbsp: &sei_rbsp_with_cc(&[[0xFC, b'A', 1]]),
            pts: 1000,
        });

        assert_eq!(cs.pending.len(), 3);

        let mut decoder = Cea608Stream::new();
        let mut sink: Vec<Event> = Vec::new();
        cs.flush(&mut decoder, &mut sink);

        let raw_pairs: Vec<[u8; 2]> = sink
            .into_iter()
            .filter_map(|e| match e {
                Event::RawPair(p) => Some(p.cea608),
                Event::Cue(_) => None,
            })
            .collect();
        // Both pts=1000 packets (arrival order A,0 then A,1) precede the pts=2000 packet.
        assert_eq!(raw_pairs, vec![[b'A', 0], [b'A', 1], [b'B', 0]]);
        assert!(cs.pending.is_empty());
    }

    #[test]
    fn flush_on_empty_buffer_still_calls_decoder_flush() {
        let mut cs = CaptionStream::new();
        let mut decoder = Cea608Stream::new();
        let mut sink: Vec<Event> = Vec::new();
        cs.flush(&mut decoder, &mut sink);
        assert!(sink.is_empty());
    }
}
