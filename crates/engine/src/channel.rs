use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct LaneSender<T> {
    name: &'static str,
    tx: mpsc::Sender<T>,
}

impl<T> Clone for LaneSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<T> LaneSender<T> {
    // Fire-and-forget: a full or detached lane drops the message.
    pub fn send(&self, message: T) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(lane = self.name, "lane full, message dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(lane = self.name, "lane detached, message dropped");
                false
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

pub struct LaneReceiver<T> {
    name: &'static str,
    rx: mpsc::Receiver<T>,
}

impl<T> LaneReceiver<T> {
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

pub fn lane<T>(name: &'static str, capacity: usize) -> (LaneSender<T>, LaneReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (LaneSender { name, tx }, LaneReceiver { name, rx })
}
