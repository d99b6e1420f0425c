//! Room admission: gathering participants before a match may start.

use super::SessionError;
use async_trait::async_trait;
use log::debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

/// External collaborator that gathers participants up to capacity. The core
/// starts a match only after this succeeds.
#[async_trait]
pub trait RoomAdmission: Send + Sync {
    /// Resolves `true` once the room has reached capacity, `false` if
    /// `window` elapses first.
    async fn wait_until_capacity_reached(&self, window: Duration) -> bool;

    fn is_closed(&self) -> bool;
}

#[derive(Default)]
struct RoomInner {
    registered: usize,
    closed: bool,
}

/// In-process waiting room for tests and local matches.
pub struct LocalRoom {
    capacity: usize,
    inner: Mutex<RoomInner>,
    notify: Notify,
}

impl LocalRoom {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(RoomInner::default()),
            notify: Notify::new(),
        }
    }

    fn inner(&self) -> MutexGuard<'_, RoomInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self) -> Result<(), SessionError> {
        let mut inner = self.inner();
        if inner.closed {
            return Err(SessionError::RoomClosed);
        }
        if inner.registered >= self.capacity {
            return Err(SessionError::RoomFull);
        }
        inner.registered += 1;
        debug!("room registration {}/{}", inner.registered, self.capacity);
        drop(inner);
        self.notify.notify_waiters();
        Ok(())
    }

    pub fn close(&self) {
        self.inner().closed = true;
        self.notify.notify_waiters();
    }

    pub fn registered(&self) -> usize {
        self.inner().registered
    }
}

#[async_trait]
impl RoomAdmission for LocalRoom {
    async fn wait_until_capacity_reached(&self, window: Duration) -> bool {
        timeout(window, async {
            loop {
                let notified = self.notify.notified();
                {
                    let inner = self.inner();
                    // A closed room also stops the wait; the caller checks
                    // is_closed to tell the cases apart.
                    if inner.registered >= self.capacity || inner.closed {
                        return;
                    }
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }

    fn is_closed(&self) -> bool {
        self.inner().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_room_fills_to_capacity_and_no_further() {
        let room = LocalRoom::new(2);
        room.register().expect("seat 1");
        room.register().expect("seat 2");
        assert_eq!(room.register(), Err(SessionError::RoomFull));
        assert!(room.wait_until_capacity_reached(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_room_wait_times_out_when_underfull() {
        let room = LocalRoom::new(2);
        room.register().expect("seat 1");
        assert!(!room.wait_until_capacity_reached(Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn test_closed_room_rejects_registration() {
        let room = LocalRoom::new(2);
        room.close();
        assert_eq!(room.register(), Err(SessionError::RoomClosed));
        assert!(room.is_closed());
    }
}
