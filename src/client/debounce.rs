//! Debounced address lookup.
//!
//! Every address change bumps a sequence number. A scheduled lookup only hits
//! the geocoder if no newer change arrived during the quiescence window, and
//! its response is only published if it is still the newest once it returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::geocoding::{AddressMatch, Geocoder};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

pub struct AddressLookup {
    geocoder: Arc<dyn Geocoder>,
    delay: Duration,
    latest: Arc<AtomicU64>,
    suggestion: Arc<watch::Sender<Option<AddressMatch>>>,
    pending: Option<JoinHandle<()>>,
}

impl AddressLookup {
    pub fn new(geocoder: Arc<dyn Geocoder>, delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            geocoder,
            delay,
            latest: Arc::new(AtomicU64::new(0)),
            suggestion: Arc::new(tx),
            pending: None,
        }
    }

    pub fn with_default_delay(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::new(geocoder, DEFAULT_DEBOUNCE)
    }

    /// Current best match, if any.
    pub fn suggestion(&self) -> Option<AddressMatch> {
        self.suggestion.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AddressMatch>> {
        self.suggestion.subscribe()
    }

    /// Sequence number of the most recent change.
    pub fn current_sequence(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Records an address edit and schedules a lookup after the quiescence delay.
    /// Must be called from within a tokio runtime. Returns the change's sequence number.
    pub fn on_address_change(&mut self, text: &str) -> u64 {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let query = text.trim().to_string();

        if query.is_empty() {
            self.suggestion.send_replace(None);
            return seq;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let latest = Arc::clone(&self.latest);
        let suggestion = Arc::clone(&self.suggestion);
        let delay = self.delay;

        // A superseded task exits on its own after the sequence check
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) != seq {
                return;
            }

            match geocoder.search(&query).await {
                Ok(matches) => {
                    if latest.load(Ordering::SeqCst) != seq {
                        tracing::debug!(seq, query = %query, "Discarding stale geocoding response");
                        return;
                    }
                    suggestion.send_replace(matches.into_iter().next());
                }
                Err(e) => {
                    tracing::warn!(seq, query = %query, error = %e, "Geocoding lookup failed");
                }
            }
        }));
        seq
    }
}

impl Drop for AddressLookup {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
