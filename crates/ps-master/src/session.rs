//! Builder side of a playback session.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use ps_engine::{EventTimeline, Sequencer};
use ps_ir::{DynamicLevelLayers, PlaybackData, PlaybackEventsMap, Timestamp};
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapProd, HeapRb};

use crate::config::SequencerConfig;
use crate::reader::StreamReader;
use crate::StreamNotice;

/// Pending notices the render side can lag behind by. Flush notices are
/// interchangeable, so dropping one while others are queued loses nothing.
const NOTICE_CAPACITY: usize = 64;

/// Owns the sequencer and publishes every rebuilt or appended stream to
/// the paired [`StreamReader`].
pub struct PlaybackSession {
    sequencer: Sequencer,
    main: Arc<ArcSwap<EventTimeline>>,
    off: Arc<ArcSwap<EventTimeline>>,
    position: Arc<AtomicI64>,
    notices: HeapProd<StreamNotice>,
    /// Set by the sequencer when it flushes the main stream. The notice is
    /// only sent once the rebuilt stream has been published.
    flush_pending: Arc<AtomicBool>,
}

/// Create a session for `data` and the reader that plays it.
///
/// The main stream is built before this returns, and the reader starts
/// with one pending flush notice from that initial build.
pub fn open_session(config: &SequencerConfig, data: PlaybackData) -> (PlaybackSession, StreamReader) {
    let (notices, consumer) = HeapRb::<StreamNotice>::new(NOTICE_CAPACITY).split();

    let main = Arc::new(ArcSwap::from_pointee(EventTimeline::new()));
    let off = Arc::new(ArcSwap::from_pointee(EventTimeline::new()));
    let position = Arc::new(AtomicI64::new(0));
    let flush_pending = Arc::new(AtomicBool::new(false));

    let mut sequencer = Sequencer::new();
    let flushed = flush_pending.clone();
    sequencer.set_on_main_stream_flushed(move || flushed.store(true, Ordering::Release));
    sequencer.load(data);
    sequencer.init(config.params_mapping(), config.use_dynamic_events);

    let reader = StreamReader::new(main.clone(), off.clone(), consumer, position.clone());

    let mut session = PlaybackSession {
        sequencer,
        main,
        off,
        position,
        notices,
        flush_pending,
    };
    session.publish_main();

    (session, reader)
}

impl PlaybackSession {
    /// Replace the origin performance and rebuild the main stream.
    pub fn load(&mut self, data: PlaybackData) {
        self.sequencer.load(data);
        self.publish_main();
    }

    pub fn update_main_stream_events(&mut self, events: &PlaybackEventsMap, dynamics: &DynamicLevelLayers) {
        self.sequencer.update_main_stream_events(events, dynamics);
        self.publish_main();
    }

    pub fn update_off_stream_events(&mut self, events: &PlaybackEventsMap, dynamics: &DynamicLevelLayers) {
        self.sequencer.update_off_stream_events(events, dynamics);
        self.publish_off();
    }

    /// Gain at the position the render side last reached.
    pub fn current_gain(&mut self) -> f32 {
        self.sequencer.set_playback_position(self.playback_position());
        self.sequencer.current_gain()
    }

    /// Position the render side last reached.
    pub fn playback_position(&self) -> Timestamp {
        self.position.load(Ordering::Relaxed)
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Publish the main stream, then tell the reader to switch to it if
    /// it was flushed. The reader never sees the notice before the stream.
    fn publish_main(&mut self) {
        self.main.store(Arc::new(self.sequencer.main_stream().clone()));
        log::trace!("published main stream ({} events)", self.sequencer.main_stream().len());

        if self.flush_pending.swap(false, Ordering::AcqRel)
            && self.notices.try_push(StreamNotice::MainStreamFlushed).is_err()
        {
            log::debug!("flush notice queue full, render side is lagging");
        }
    }

    fn publish_off(&mut self) {
        self.off.store(Arc::new(self.sequencer.off_stream().clone()));
        log::trace!("published off stream ({} events)", self.sequencer.off_stream().len());
    }
}
