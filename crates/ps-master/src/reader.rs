//! Render side of a playback session.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use ps_engine::EventTimeline;
use ps_ir::{OutputEvent, Timestamp};
use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use crate::StreamNotice;

/// What the reader hands to the plugin dispatcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StreamEvent<'a> {
    /// The main stream was rebuilt. Notes started from the old stream
    /// should be silenced before anything else is dispatched.
    Flushed,
    Event(Timestamp, &'a OutputEvent),
}

/// Walks the published streams as playback time advances.
///
/// Never blocks. The reader keeps playing the main stream it holds until a
/// flush notice arrives, then reports the flush and switches to the latest
/// published main stream, so events of an old and a new main stream are
/// never mixed within a flush. The off stream only grows and is reloaded
/// every block. Both continue from the reader's own timestamp cursor.
pub struct StreamReader {
    main: Arc<ArcSwap<EventTimeline>>,
    /// The main stream being played.
    current: Arc<EventTimeline>,
    off: Arc<ArcSwap<EventTimeline>>,
    notices: HeapCons<StreamNotice>,
    position: Arc<AtomicI64>,
    /// Next timestamp to deliver.
    cursor: Timestamp,
}

impl StreamReader {
    pub(crate) fn new(
        main: Arc<ArcSwap<EventTimeline>>,
        off: Arc<ArcSwap<EventTimeline>>,
        notices: HeapCons<StreamNotice>,
        position: Arc<AtomicI64>,
    ) -> Self {
        let cursor = position.load(Ordering::Relaxed);
        let current = main.load_full();
        Self {
            main,
            current,
            off,
            notices,
            position,
            cursor,
        }
    }

    /// Jump playback to `position`.
    pub fn seek(&mut self, position: Timestamp) {
        self.cursor = position;
        self.position.store(position, Ordering::Relaxed);
    }

    pub fn position(&self) -> Timestamp {
        self.cursor
    }

    /// Deliver everything scheduled from the cursor up to `until`
    /// (inclusive) and advance past it. Pending flush notices are reported
    /// first, once. Within a timestamp, main-stream events precede
    /// off-stream events. Returns the number of output events delivered.
    pub fn render_until<F>(&mut self, until: Timestamp, mut f: F) -> usize
    where
        F: FnMut(StreamEvent<'_>),
    {
        let mut flushed = false;
        while let Some(notice) = self.notices.try_pop() {
            match notice {
                StreamNotice::MainStreamFlushed => flushed = true,
            }
        }
        if flushed {
            self.current = self.main.load_full();
            f(StreamEvent::Flushed);
        }

        if until < self.cursor {
            return 0;
        }

        let main = &self.current;
        let off = self.off.load();
        let mut main_events = main.range(self.cursor, until).peekable();
        let mut off_events = off.range(self.cursor, until).peekable();

        let mut delivered = 0;
        loop {
            let take_main = match (main_events.peek(), off_events.peek()) {
                (Some((main_ts, _)), Some((off_ts, _))) => main_ts <= off_ts,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            let next = if take_main { main_events.next() } else { off_events.next() };
            if let Some((timestamp, set)) = next {
                for event in set {
                    f(StreamEvent::Event(timestamp, event));
                    delivered += 1;
                }
            }
        }

        self.cursor = until.saturating_add(1);
        self.position.store(self.cursor, Ordering::Relaxed);
        delivered
    }
}
