//! The receiving end of a directory scan.

use tokio::sync::mpsc;
use tracing::warn;

use crate::ScanEvent;

/// Capacity of the bounded channel between a backend and its consumer.
pub const SCAN_CHANNEL_CAPACITY: usize = 256;

/// The sending half handed to a backend's producer task.
pub type ScanSender = mpsc::Sender<ScanEvent>;

/// A stream of [`ScanEvent`]s for one scan request.
///
/// [`ScanEvent::Finished`] is always the last event yielded. If the producer
/// goes away without sending it, the stream synthesizes one so consumers
/// still observe a terminal signal.
///
/// # Examples
///
/// ```
/// use taggy_core::AudioFile;
/// use taggy_scanner::{ScanEvent, ScanStream};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let mut stream = ScanStream::from_events(vec![
///     ScanEvent::FileScanned(Box::new(AudioFile::new("/music/a.mp3"))),
///     ScanEvent::Finished,
/// ]);
///
/// assert!(matches!(stream.next_event().await, Some(ScanEvent::FileScanned(_))));
/// assert!(matches!(stream.next_event().await, Some(ScanEvent::Finished)));
/// assert!(stream.next_event().await.is_none());
/// # });
/// ```
#[derive(Debug)]
pub struct ScanStream {
    receiver: mpsc::Receiver<ScanEvent>,
    finished: bool,
}

impl ScanStream {
    /// Creates a connected sender and stream.
    #[must_use]
    pub fn channel() -> (ScanSender, Self) {
        let (sender, receiver) = mpsc::channel(SCAN_CHANNEL_CAPACITY);
        (sender, Self::new(receiver))
    }

    /// Wraps an existing receiver.
    #[must_use]
    pub const fn new(receiver: mpsc::Receiver<ScanEvent>) -> Self {
        Self {
            receiver,
            finished: false,
        }
    }

    /// Creates a stream that replays a fixed list of events.
    #[must_use]
    pub fn from_events(events: Vec<ScanEvent>) -> Self {
        let (sender, receiver) = mpsc::channel(events.len().max(1));
        for event in events {
            if sender.try_send(event).is_err() {
                break;
            }
        }
        Self::new(receiver)
    }

    /// Receives the next event, or `None` once the scan has finished.
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        if self.finished {
            return None;
        }

        let event = if let Some(event) = self.receiver.recv().await {
            event
        } else {
            warn!("Scan channel closed without a finished signal");
            ScanEvent::Finished
        };

        if matches!(event, ScanEvent::Finished) {
            self.finished = true;
            self.receiver.close();
        }
        Some(event)
    }

    /// Returns `true` once [`ScanEvent::Finished`] has been yielded.
    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}
