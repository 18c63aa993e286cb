//! The tagged output of the pipeline: decoded cues and the raw byte-pair sidechannel.

/// A timed caption cue ready for a text-track renderer.
///
/// Field names and defaults (`align`, `position_align`, `size`, `snap_to_lines`) follow the
/// WebVTT cue settings the downstream renderer is expected to consume.
#[derive(Debug, Clone, PartialEq)]
pub struct CueEvent {
    pub start_pts: i64,
    pub end_pts: i64,
    /// Non-empty display rows, trimmed and joined by `'\n'`.
    pub text: String,
    pub line: Option<f32>,
    pub align: &'static str,
    pub position: Option<f32>,
    pub position_align: &'static str,
    pub size: u8,
    pub snap_to_lines: bool,
}

/// The undecoded CEA-608 byte pair, forwarded on every processed CC packet.
///
/// Consumers that want the raw byte-pair stream (e.g. for re-muxing or debugging) subscribe to
/// this; everyone else ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPairEvent {
    pub pts: i64,
    pub cea608: [u8; 2],
}

/// A single item flowing out of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Cue(CueEvent),
    RawPair(RawPairEvent),
}

/// Where decoded [`Event`]s go.
///
/// A sink is a single method so both closures and plain collecting buffers work as call sites
/// without an adapter type.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl<F: FnMut(Event)> EventSink for F {
    fn emit(&mut self, event: Event) {
        (self)(event)
    }
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event)
    }
}
