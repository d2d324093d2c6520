//! `Tx` channel abstraction over different concrete channel kinds, so that the rest of the
//! workspace can be generic over "some sink that domain events are pushed into" rather than
//! tying every producer to `tokio::sync::mpsc` directly.

use crate::error::IntegrationError;
use tokio::sync::{broadcast, mpsc};

/// Abstraction over a channel sender.
///
/// `orion-marketdata`'s coalescer and `orion-outbox`'s relay both push items into some `Tx`
/// without needing to know if the receiver is a per-subscriber `mpsc` channel or a `broadcast`
/// channel used for the kill-switch propagation topic.
pub trait Tx<Item> {
    /// Send an `Item`, returning an [`IntegrationError`] if the receiver has gone away.
    fn send(&self, item: Item) -> Result<(), IntegrationError>;
}

impl<Item> Tx<Item> for mpsc::UnboundedSender<Item> {
    fn send(&self, item: Item) -> Result<(), IntegrationError> {
        self.send(item).map_err(IntegrationError::from)
    }
}

impl<Item: Clone> Tx<Item> for broadcast::Sender<Item> {
    fn send(&self, item: Item) -> Result<(), IntegrationError> {
        self.send(item)
            .map(|_receiver_count| ())
            .map_err(|_| IntegrationError::RxDropped)
    }
}

/// A [`Tx`] wrapper that silently drops sends once the receiver has disappeared, instead of
/// propagating an error. Used by best-effort fan-out paths (eg/ the market-data coalescer,
/// where a single slow/gone subscriber must never block the others).
#[derive(Debug, Clone)]
pub struct ChannelTxDroppable<T> {
    inner: T,
}

impl<T> ChannelTxDroppable<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<Item, T> ChannelTxDroppable<T>
where
    T: Tx<Item>,
{
    pub fn send(&self, item: Item) {
        if self.inner.send(item).is_err() {
            tracing::debug!("dropping send: receiver gone");
        }
    }
}
