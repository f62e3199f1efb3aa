//! Background reporting of cart additions.
//!
//! Additions are queued on an unbounded channel and sent one at a time by a
//! single Tokio task, so the cart never waits on the network. The outcome of
//! each report only touches the shared [`CartErrorFlag`].

use std::future::Future;

use tokio::sync::{mpsc, oneshot};

use super::{CART_SYNC_FAILED_MESSAGE, CartErrorFlag};
use crate::api::{ApiClient, ApiError, CartAddition};

/// Destination for cart addition reports.
pub trait CartSync: Send + Sync + 'static {
    /// Register one addition remotely.
    fn register_addition(
        &self,
        addition: CartAddition,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CartSync for ApiClient {
    async fn register_addition(&self, addition: CartAddition) -> Result<(), ApiError> {
        self.register_cart_addition(&addition).await
    }
}

enum Job {
    Register(CartAddition),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background reporting task.
///
/// Dropping the handle closes the queue; the task finishes what is already
/// queued and exits.
#[derive(Debug, Clone)]
pub struct CartNotifier {
    tx: mpsc::UnboundedSender<Job>,
}

impl CartNotifier {
    /// Spawn the reporting task on the current Tokio runtime.
    pub fn spawn<S: CartSync>(sink: S, error: CartErrorFlag) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(sink, error, rx));
        Self { tx }
    }

    /// Queue an addition for reporting.
    pub fn dispatch(&self, addition: CartAddition) {
        if self.tx.send(Job::Register(addition)).is_err() {
            tracing::warn!("Cart notifier has stopped; addition not reported");
        }
    }

    /// Wait until every addition queued before this call has been reported.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run<S: CartSync>(sink: S, error: CartErrorFlag, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Register(addition) => {
                let product_id = addition.product_id;
                match sink.register_addition(addition).await {
                    Ok(()) => {
                        tracing::debug!(%product_id, "Cart addition registered");
                        error.clear();
                    }
                    Err(e) => {
                        tracing::warn!(%product_id, error = %e, "Failed to register cart addition");
                        error.set(CART_SYNC_FAILED_MESSAGE);
                    }
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use hardalum_core::{Price, Product, ProductId, VariantId};

    use super::*;
    use crate::cart::CartStore;
    use crate::storage::MemoryStore;

    /// Records every addition; fails while `failing` is set.
    #[derive(Clone, Default)]
    struct FakeSink {
        seen: Arc<Mutex<Vec<CartAddition>>>,
        failing: Arc<AtomicBool>,
    }

    impl CartSync for FakeSink {
        async fn register_addition(&self, addition: CartAddition) -> Result<(), ApiError> {
            self.seen.lock().unwrap().push(addition);
            if self.failing.load(Ordering::SeqCst) {
                Err(ApiError::Status {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn rod() -> Product {
        Product {
            id: ProductId::new(7),
            name: "Aluminum Rod (1/2\" Diameter)".to_string(),
            description: String::new(),
            image_url: String::new(),
            price: None,
            variants: vec![hardalum_core::Variant {
                id: VariantId::new(14),
                dimension: "24\" Length".to_string(),
                price: Price::from_cents(3200),
            }],
            category: None,
        }
    }

    #[tokio::test]
    async fn test_additions_are_reported_in_order() {
        let sink = FakeSink::default();
        let mut cart =
            CartStore::hydrate(Arc::new(MemoryStore::new()), Price::ZERO).with_sync(sink.clone());
        cart.set_user(Some(hardalum_core::UserId::new(3)));
        let product = rod();

        cart.add(&product, 2, Some(&product.variants[0]));
        cart.add(&product, 1, None);
        cart.settle().await;

        let seen = sink.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].quantity, 2);
        assert_eq!(seen[0].variant_id, Some(VariantId::new(14)));
        assert_eq!(seen[0].user_id, Some(hardalum_core::UserId::new(3)));
        assert_eq!(seen[1].variant_id, None);
        assert!(cart.error().is_none());
    }

    #[tokio::test]
    async fn test_failure_sets_error_but_keeps_local_state() {
        let sink = FakeSink::default();
        sink.failing.store(true, Ordering::SeqCst);
        let storage = Arc::new(MemoryStore::new());
        let mut cart =
            CartStore::hydrate(storage.clone(), Price::ZERO).with_sync(sink.clone());
        let product = rod();

        cart.add(&product, 3, Some(&product.variants[0]));
        assert_eq!(cart.items().len(), 1);

        cart.settle().await;
        assert_eq!(cart.error().as_deref(), Some(CART_SYNC_FAILED_MESSAGE));
        assert_eq!(cart.items()[0].quantity, 3);

        let rehydrated = CartStore::hydrate(storage, Price::ZERO);
        assert_eq!(rehydrated.items(), cart.items());
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let sink = FakeSink::default();
        sink.failing.store(true, Ordering::SeqCst);
        let mut cart =
            CartStore::hydrate(Arc::new(MemoryStore::new()), Price::ZERO).with_sync(sink.clone());
        let product = rod();

        cart.add(&product, 1, None);
        cart.settle().await;
        assert!(cart.error().is_some());

        sink.failing.store(false, Ordering::SeqCst);
        cart.add(&product, 1, None);
        cart.settle().await;
        assert!(cart.error().is_none());
    }

    #[tokio::test]
    async fn test_clear_error_and_non_add_mutations_send_nothing() {
        let sink = FakeSink::default();
        sink.failing.store(true, Ordering::SeqCst);
        let mut cart =
            CartStore::hydrate(Arc::new(MemoryStore::new()), Price::ZERO).with_sync(sink.clone());
        let product = rod();

        cart.add(&product, 1, None);
        cart.settle().await;
        cart.clear_error();
        assert!(cart.error().is_none());

        cart.update_quantity(product.id, 5, None);
        cart.remove(product.id, None);
        cart.clear();
        cart.settle().await;
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }
}
