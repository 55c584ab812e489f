//! Publish/subscribe fan-out shared by both stores.
//!
//! Snapshots go out over a [`broadcast`] channel. Async consumers take a
//! receiver from [`Subscribers::changes`]; synchronous listeners registered
//! with [`Subscribers::subscribe`] each own a receiver that is drained right
//! after every send, so they observe the new snapshot before the mutating
//! call returns. Dropping the [`Subscription`] handle removes the listener.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

/// Listeners drain after every send, so a small buffer never lags.
const CHANNEL_CAPACITY: usize = 16;

type Listener<T> = Arc<dyn Fn(&Arc<T>) + Send + Sync>;

struct Slot<T> {
  receiver: broadcast::Receiver<Arc<T>>,
  listener: Listener<T>,
  /// Dead once the owning [`Subscription`] is dropped.
  alive:    Weak<()>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  // A panicking listener must not take the whole store down with it.
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Subscribers ─────────────────────────────────────────────────────────────

/// Fan-out point for one store's snapshots.
pub struct Subscribers<T> {
  sender: broadcast::Sender<Arc<T>>,
  slots:  Mutex<Vec<Slot<T>>>,
}

impl<T> Default for Subscribers<T> {
  fn default() -> Self {
    let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
    Self {
      sender,
      slots: Mutex::new(Vec::new()),
    }
  }
}

impl<T: Send + Sync + 'static> Subscribers<T> {
  /// Register `listener` and return the handle that keeps it alive.
  pub fn subscribe<F>(&self, listener: F) -> Subscription
  where
    F: Fn(&Arc<T>) + Send + Sync + 'static,
  {
    let token = Arc::new(());
    lock(&self.slots).push(Slot {
      receiver: self.sender.subscribe(),
      listener: Arc::new(listener),
      alive:    Arc::downgrade(&token),
    });
    Subscription { _token: token }
  }

  /// A receiver for async consumers. It sees every snapshot sent after this
  /// call; a consumer that falls behind gets `RecvError::Lagged`.
  pub fn changes(&self) -> broadcast::Receiver<Arc<T>> {
    self.sender.subscribe()
  }

  /// Send `snapshot` and deliver it to every listener, in subscription order.
  pub fn notify(&self, snapshot: &Arc<T>) {
    // Ignore send errors (no receivers)
    let _ = self.sender.send(Arc::clone(snapshot));

    // Listeners run outside the lock so they may (un)subscribe.
    let mut deliveries = Vec::new();
    {
      let mut slots = lock(&self.slots);
      slots.retain(|slot| slot.alive.strong_count() > 0);
      for slot in slots.iter_mut() {
        loop {
          match slot.receiver.try_recv() {
            Ok(snapshot) => {
              deliveries.push((Arc::clone(&slot.listener), snapshot));
            }
            Err(TryRecvError::Lagged(n)) => {
              debug!(skipped = n, "listener lagged, skipped snapshots");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
          }
        }
      }
    }
    for (listener, snapshot) in deliveries {
      listener(&snapshot);
    }
  }

  /// Number of live synchronous listeners.
  pub fn len(&self) -> usize {
    lock(&self.slots)
      .iter()
      .filter(|slot| slot.alive.strong_count() > 0)
      .count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// Handle returned by `subscribe`. The listener stays registered for as long
/// as the handle lives.
#[must_use = "dropping a Subscription unsubscribes its listener"]
#[derive(Debug)]
pub struct Subscription {
  _token: Arc<()>,
}

impl Subscription {
  /// Remove the listener now. Equivalent to dropping the handle.
  pub fn unsubscribe(self) {}
}
