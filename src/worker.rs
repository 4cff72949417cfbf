use crate::api::Client;
use crate::error::SuggestError;
use crate::models::Suggestions;
use crate::session::RequestToken;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

pub type SuggestReply = (RequestToken, Result<Option<Suggestions>, SuggestError>);

/// Runs suggest requests in the background.
///
/// Replies arrive in completion order, not submission order; the session
/// decides which one to keep.
pub struct SuggestWorker {
    client: Arc<Client>,
    sender: Sender<SuggestReply>,
    receiver: Receiver<SuggestReply>,
}

impl SuggestWorker {
    pub fn new(client: Client) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            client: Arc::new(client),
            sender,
            receiver,
        }
    }

    pub fn submit(&self, token: RequestToken, query: String) {
        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = client.suggest(&query);
            let _ = sender.send((token, result));
        });
    }

    pub fn try_recv(&self) -> Option<SuggestReply> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the next reply. `None` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SuggestReply> {
        match self.receiver.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
