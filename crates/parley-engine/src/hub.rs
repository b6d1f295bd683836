// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide resumable stream hub.
//!
//! Each active stream gets a broadcast channel plus a bounded replay ring.
//! A publisher writes events once; any number of subscribers replay the ring
//! and then follow live events until the terminal event. The hub is a
//! process-wide singleton with three states: uninitialized, ready, or
//! disabled. The disabled state is decided by the first caller from config,
//! cached, and never retried.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use dashmap::DashMap;
use parley_core::types::OutgoingEvent;
use parley_core::GENERIC_FAILURE_MESSAGE;
use parley_config::model::ResumeConfig;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

static HUB: OnceLock<Option<Arc<StreamHub>>> = OnceLock::new();

/// Returns the process-wide hub, initializing it from `config` on first call.
///
/// A disabled or zero-capacity config yields `None`; the decision is cached
/// for the process lifetime, so later callers see the same answer without
/// re-reading config.
pub fn global_hub(config: &ResumeConfig) -> Option<Arc<StreamHub>> {
    HUB.get_or_init(|| {
        if !config.enabled || config.replay_capacity == 0 {
            warn!("stream hub disabled; streams will not be resumable");
            None
        } else {
            info!(
                replay_capacity = config.replay_capacity,
                max_retained = config.max_retained,
                "stream hub initialized"
            );
            Some(Arc::new(StreamHub::new(
                config.replay_capacity,
                config.max_retained,
            )))
        }
    })
    .clone()
}

/// Per-stream channel state: a live broadcast sender plus the replay ring.
struct StreamEntry {
    seq: AtomicU64,
    tx: broadcast::Sender<(u64, OutgoingEvent)>,
    ring: RwLock<VecDeque<(u64, OutgoingEvent)>>,
}

/// Fan-out hub for resumable streams.
pub struct StreamHub {
    replay_capacity: usize,
    max_retained: usize,
    streams: DashMap<String, Arc<StreamEntry>>,
    /// Finished stream ids in completion order, for bounded retention.
    finished_order: Mutex<VecDeque<String>>,
}

impl StreamHub {
    pub fn new(replay_capacity: usize, max_retained: usize) -> Self {
        Self {
            replay_capacity,
            max_retained,
            streams: DashMap::new(),
            finished_order: Mutex::new(VecDeque::new()),
        }
    }

    /// Registers a stream and returns its publisher handle.
    pub fn open(self: &Arc<Self>, stream_id: &str) -> StreamPublisher {
        let (tx, _) = broadcast::channel(self.replay_capacity.max(16));
        let entry = Arc::new(StreamEntry {
            seq: AtomicU64::new(0),
            tx,
            ring: RwLock::new(VecDeque::with_capacity(self.replay_capacity)),
        });
        self.streams.insert(stream_id.to_string(), entry.clone());
        debug!(stream_id, "stream opened");
        StreamPublisher {
            hub: Arc::clone(self),
            stream_id: stream_id.to_string(),
            entry,
        }
    }

    /// Reattaches to a stream: replays the ring, then follows live events
    /// until the terminal event. `None` when the stream id is unknown or
    /// already evicted.
    pub fn subscribe(&self, stream_id: &str) -> Option<mpsc::UnboundedReceiver<OutgoingEvent>> {
        let entry = self.streams.get(stream_id)?.clone();
        // Subscribe before snapshotting so nothing falls between the two;
        // sequence numbers dedupe the overlap.
        let mut rx = entry.tx.subscribe();
        let snapshot: Vec<(u64, OutgoingEvent)> = entry
            .ring
            .read()
            .expect("stream ring poisoned")
            .iter()
            .cloned()
            .collect();

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut last_seq = 0;
            for (seq, event) in snapshot {
                last_seq = seq;
                let terminal = event.is_terminal();
                if out_tx.send(event).is_err() || terminal {
                    return;
                }
            }
            loop {
                match rx.recv().await {
                    Ok((seq, event)) => {
                        if seq <= last_seq {
                            continue;
                        }
                        last_seq = seq;
                        let terminal = event.is_terminal();
                        if out_tx.send(event).is_err() || terminal {
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "subscriber lagged, terminating resumed stream");
                        let _ = out_tx.send(OutgoingEvent::Error {
                            message: GENERIC_FAILURE_MESSAGE.to_string(),
                        });
                        return;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // Publisher vanished without a terminal event.
                        let _ = out_tx.send(OutgoingEvent::Error {
                            message: GENERIC_FAILURE_MESSAGE.to_string(),
                        });
                        return;
                    }
                }
            }
        });
        Some(out_rx)
    }

    /// Number of streams currently tracked (live and retained).
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    fn mark_finished(&self, stream_id: &str) {
        let mut order = self.finished_order.lock().expect("finished order poisoned");
        order.push_back(stream_id.to_string());
        while order.len() > self.max_retained {
            if let Some(evicted) = order.pop_front() {
                self.streams.remove(&evicted);
                debug!(stream_id = %evicted, "finished stream evicted");
            }
        }
    }
}

/// Write handle for one stream.
pub struct StreamPublisher {
    hub: Arc<StreamHub>,
    stream_id: String,
    entry: Arc<StreamEntry>,
}

impl StreamPublisher {
    /// Appends an event to the replay ring and fans it out to live
    /// subscribers. A terminal event moves the stream into bounded retention.
    pub fn publish(&self, event: OutgoingEvent) {
        let seq = self.entry.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let terminal = event.is_terminal();
        {
            let mut ring = self.entry.ring.write().expect("stream ring poisoned");
            ring.push_back((seq, event.clone()));
            while ring.len() > self.hub.replay_capacity {
                let _ = ring.pop_front();
            }
        }
        let _ = self.entry.tx.send((seq, event));
        if terminal {
            self.hub.mark_finished(&self.stream_id);
        }
    }
}

/// Destination for orchestrator events: the hub when resumption is enabled,
/// a plain per-request channel otherwise.
pub enum EventSink {
    Hub(StreamPublisher),
    Plain(mpsc::UnboundedSender<OutgoingEvent>),
}

impl EventSink {
    pub fn send(&self, event: OutgoingEvent) {
        match self {
            EventSink::Hub(publisher) => publisher.publish(event),
            EventSink::Plain(tx) => {
                let _ = tx.send(event);
            }
        }
    }
}
