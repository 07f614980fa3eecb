use tokio::sync::watch;

/// Transmitter side of the worker shutdown channel.
///
/// [`ShutdownTx`] is cloned into every worker so that the worker consuming the shutdown
/// sentinel can stop the whole pool.
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<bool>);

impl ShutdownTx {
    /// Wraps a watch sender into a [`ShutdownTx`].
    pub fn new(tx: watch::Sender<bool>) -> Self {
        Self(tx)
    }

    /// Signals all subscribed workers to shut down.
    pub fn shutdown(&self) {
        // Use infallible send to support shutting down before any receivers subscribe.
        self.0.send_replace(true);
    }

    /// Returns `true` if shutdown was already signaled.
    pub fn is_shutdown(&self) -> bool {
        *self.0.borrow()
    }

    /// Creates a new shutdown receiver subscription.
    pub fn subscribe(&self) -> ShutdownRx {
        ShutdownRx(self.0.subscribe())
    }
}

/// Receiver side of the worker shutdown channel.
#[derive(Debug, Clone)]
pub struct ShutdownRx(watch::Receiver<bool>);

impl ShutdownRx {
    /// Returns `true` if shutdown was already signaled.
    pub fn is_shutdown(&self) -> bool {
        *self.0.borrow()
    }

    /// Waits until shutdown is signaled.
    ///
    /// Returns immediately if it already was. If every transmitter is dropped without
    /// signaling, this also returns, since no shutdown can be requested anymore and waiting
    /// forever would leak the worker.
    pub async fn wait(&mut self) {
        let _ = self.0.wait_for(|shutdown| *shutdown).await;
    }
}

/// Creates a new shutdown channel.
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTx::new(tx), ShutdownRx(rx))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_shutdown_reaches_every_subscriber() {
        let (tx, rx) = create_shutdown_channel();
        let mut first = rx.clone();
        let mut second = tx.subscribe();

        assert!(!first.is_shutdown());

        tx.shutdown();

        tokio::time::timeout(Duration::from_secs(1), first.wait())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), second.wait())
            .await
            .unwrap();
        assert!(rx.is_shutdown());
        assert!(tx.is_shutdown());
    }

    #[tokio::test]
    async fn test_wait_returns_when_transmitter_is_dropped() {
        let (tx, mut rx) = create_shutdown_channel();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), rx.wait())
            .await
            .unwrap();
        assert!(!rx.is_shutdown());
    }
}
