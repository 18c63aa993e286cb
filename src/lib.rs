//! `cea608-sei` extracts CEA-608 closed captions tunneled as CEA-708 `user_data` in H.264 SEI
//! messages, and decodes them into timed cues.
//!
//! This crate provides:
//! - A synchronous, caller-driven pipeline: feed [`NalEvent`]s into a [`CaptionStream`], flush
//!   into a [`Cea608Stream`], collect [`Event`]s.
//! - A Tokio-based async wrapper (enabled by default) that runs the same pipeline on a background
//!   task and exposes it as a `Stream` of [`Event`]s.
//!
//! ## Quick start (sync)
//! ```
//! use cea608_sei::{CaptionStream, Cea608Stream, Event};
//!
//! let mut captions = CaptionStream::new();
//! let mut decoder = Cea608Stream::new();
//! let mut events: Vec<Event> = Vec::new();
//!
//! // captions.push(nal_event);
//! captions.flush(&mut decoder, &mut events);
//! ```
//!
//! ## Quick start (async)
//! - Use [`async_stream::AsyncCaptionPipeline`] to get a Tokio `Stream` of events.
//!
//! ## Features
//! - `async` (default): enables the Tokio pipeline.

mod cc_packet;
mod cea608;
mod caption_stream;
mod event;
mod sei;
mod user_data;

#[cfg(feature = "async")]
pub mod async_stream;

pub use caption_stream::{CaptionStream, NalEvent, NalUnitType};
pub use cc_packet::CcPacket;
pub use cea608::{Cea608Stream, Mode};
pub use event::{CueEvent, Event, EventSink, RawPairEvent};

#[cfg(feature = "async")]
pub use async_stream::{AsyncCaptionPipeline, OwnedNalEvent};
