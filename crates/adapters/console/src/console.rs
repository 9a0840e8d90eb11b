//! Console sink shared by the console actions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use gather_domain::id::{ActorId, EventId};

/// Number of deliveries kept in the transcript.
const TRANSCRIPT_CAPACITY: usize = 256;

/// One line shown to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub event_id: EventId,
    pub recipient: ActorId,
    pub text: String,
}

/// Writes deliveries to the log and keeps the most recent ones.
#[derive(Debug, Clone, Default)]
pub struct Console {
    transcript: Arc<Mutex<VecDeque<Delivery>>>,
}

impl Console {
    /// Deliver `text` to every recipient. Returns how many were reached.
    pub fn deliver(&self, event_id: EventId, recipients: &[ActorId], text: &str) -> usize {
        if recipients.is_empty() {
            tracing::debug!(%event_id, text, "no entrants to deliver to");
            return 0;
        }

        let mut transcript = self
            .transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for recipient in recipients {
            tracing::info!(%event_id, %recipient, "{text}");
            if transcript.len() == TRANSCRIPT_CAPACITY {
                transcript.pop_front();
            }
            transcript.push_back(Delivery {
                event_id,
                recipient: *recipient,
                text: text.to_string(),
            });
        }
        recipients.len()
    }

    /// Most recent deliveries, oldest first.
    #[must_use]
    pub fn transcript(&self) -> Vec<Delivery> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Texts of the most recent deliveries, oldest first.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.transcript().into_iter().map(|d| d.text).collect()
    }
}
