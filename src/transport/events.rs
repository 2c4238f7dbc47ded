use tokio::sync::broadcast;

/// Everything the transport announces to the surrounding UI.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    EndOfStream,
    /// A seek was issued to the engine.
    Seeked { position: i32 },
    /// The engine displayed the frame a pending seek asked for.
    SeekCompleted,
    StatusMessage(String),
    AudioLevels(Vec<f64>),
    InChanged(i32),
    OutChanged(i32),
    /// In point and inclusive length of the in..=out selection.
    SelectionChanged { in_point: i32, duration: i32 },
    Played { speed: f64 },
    Paused,
    Stopped,
    Rewound,
    FastForwarded,
    /// Skipped back to a marker; carries the playhead before the jump.
    PreviousSoughtFrom { position: i32 },
    /// Skipped back to the in point.
    PreviousSought,
    /// Skipped ahead to a marker; carries the playhead before the jump.
    NextSoughtFrom { position: i32 },
    /// Skipped ahead to the out point.
    NextSought,
    ProfileChanged,
    ZoomChanged(f64),
    ScrolledHorizontally(i32),
    ScrolledVertically(i32),
    ShowPlaying,
    ShowPaused,
    FrameShown { position: i32, fraction: f64 },
    VolumeChanged(f64),
    MoveToScreenRequested(Option<usize>),
}

/// Fan-out of transport events to any number of observers.
pub struct EventBus {
    event_sender: broadcast::Sender<TransportEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_sender, _) = broadcast::channel(capacity.max(1));
        Self { event_sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.event_sender.subscribe()
    }

    pub fn emit(&self, event: TransportEvent) {
        log::trace!("Emitting {:?}", event);
        // No subscribers is fine; the UI may not be attached yet
        let _ = self.event_sender.send(event);
    }
}

/// Drains whatever is currently queued on a receiver.
pub fn drain_events(receiver: &mut broadcast::Receiver<TransportEvent>) -> Vec<TransportEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                log::warn!("Event receiver lagged, {} event(s) dropped", skipped);
            }
            Err(_) => break,
        }
    }
    events
}
