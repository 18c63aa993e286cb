#![cfg(feature = "async")]
//! A Tokio-based async wrapper around the synchronous [`CaptionStream`]/[`Cea608Stream`]
//! pipeline.
//!
//! Unlike `tesla-sei`'s file-at-a-time `stream_from_path` (which has a whole MP4 available up
//! front and drives extraction from a `spawn_blocking` loop), this crate's input is pushed in
//! incrementally by the caller as NAL units arrive. [`AsyncCaptionPipeline`] mirrors the same
//! "background task forwards over a bounded channel" shape, but the task is driven by an inbound
//! command channel instead of a file handle.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::caption_stream::{CaptionStream, NalUnitType};
use crate::cea608::Cea608Stream;
use crate::event::Event;

/// An owned copy of [`crate::NalEvent`], needed because the borrowed `escaped_rbsp` slice can't
/// cross the `tokio::spawn` boundary into the background task.
#[derive(Debug, Clone)]
pub struct OwnedNalEvent {
    pub nal_unit_type: NalUnitType,
    pub escaped_rbsp: Vec<u8>,
    pub pts: i64,
}

impl OwnedNalEvent {
    fn as_event(&self) -> crate::NalEvent<'_> {
        crate::NalEvent {
            nal_unit_type: self.nal_unit_type,
            escaped_rbsp: &self.escaped_rbsp,
            pts: self.pts,
        }
    }
}

enum Command {
    Push(OwnedNalEvent),
    Flush,
}

/// A background-task-driven caption pipeline exposed as a Tokio `Stream` of [`Event`]s.
///
/// This API is enabled by default (crate feature `async`). Push NAL events with [`Self::push`]
/// and call [`Self::flush`] whenever the caller's buffering policy (e.g. "once per access unit")
/// says it's time to drain the decoder; events produced by each flush arrive on
/// [`Self::into_stream`]'s `Stream` in order.
pub struct AsyncCaptionPipeline {
    commands: mpsc::UnboundedSender<Command>,
    events: ReceiverStream<Event>,
}

impl AsyncCaptionPipeline {
    /// Spawn the background task and return a handle plus its event stream.
    ///
    /// `buffer` controls the outbound event channel's capacity; a stalled consumer applies
    /// backpressure to the background task once it fills up.
    pub fn new(buffer: usize) -> Self {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Command>();
        let (event_tx, event_rx) = mpsc::channel(buffer.max(1));

        tokio::spawn(async move {
            let mut captions = CaptionStream::new();
            let mut decoder = Cea608Stream::new();

            while let Some(command) = command_rx.recv().await {
                match command {
                    Command::Push(owned) => captions.push(owned.as_event()),
                    Command::Flush => {
                        let mut batch: Vec<Event> = Vec::new();
                        captions.flush(&mut decoder, &mut batch);
                        for event in batch {
                            if event_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        AsyncCaptionPipeline {
            commands: command_tx,
            events: ReceiverStream::new(event_rx),
        }
    }

    /// Buffer one NAL-unit event. Non-blocking: this only enqueues a command for the background
    /// task.
    ///
    /// Silently dropped if the background task has already exited (e.g. because the event stream
    /// was dropped), matching the rest of this crate's silent-drop-on-malformed-input discipline
    /// for conditions the caller can't usefully act on.
    pub fn push(&self, event: OwnedNalEvent) {
        let _ = self.commands.send(Command::Push(event));
    }

    /// Request a flush. Decoded events arrive later on the stream returned by
    /// [`Self::into_stream`], in emission order.
    pub fn flush(&self) {
        let _ = self.commands.send(Command::Flush);
    }

    /// Consume this handle's event stream, keeping the ability to keep pushing/flushing through
    /// the returned handle's sender half.
    ///
    /// Splitting this way (rather than implementing `Stream` on `AsyncCaptionPipeline` directly)
    /// keeps ownership of the `mpsc::Sender` and the `Stream` independent, so the stream can be
    /// handed to a consumer while the producer keeps a cheap handle to push more input.
    pub fn into_stream(self) -> (AsyncCaptionPipelineHandle, ReceiverStream<Event>) {
        (
            AsyncCaptionPipelineHandle {
                commands: self.commands,
            },
            self.events,
        )
    }
}

/// The producer half of a split [`AsyncCaptionPipeline`].
#[derive(Clone)]
pub struct AsyncCaptionPipelineHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl AsyncCaptionPipelineHandle {
    pub fn push(&self, event: OwnedNalEvent) {
        let _ = self.commands.send(Command::Push(event));
    }

    pub fn flush(&self) {
        let _ = self.commands.send(Command::Flush);
    }
}
