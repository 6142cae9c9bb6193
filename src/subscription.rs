use tokio::sync::watch;

/// A live view over a piece of observable state.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`]) detaches it;
/// the publisher never blocks on subscribers.
pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    pub(crate) fn new(receiver: watch::Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Latest published value
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Waits for the next change and returns it.
    /// Returns `None` once the publisher is gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until the state satisfies `predicate`
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.receiver
            .wait_for(|value| predicate(value))
            .await
            .ok()
            .map(|value| value.clone())
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sees_changes_until_publisher_drops() {
        let (sender, receiver) = watch::channel(0u32);
        let mut sub = Subscription::new(receiver);

        sender.send_replace(1);
        assert_eq!(sub.changed().await, Some(1));
        assert_eq!(sub.current(), 1);

        drop(sender);
        assert_eq!(sub.changed().await, None);
    }

    #[tokio::test]
    async fn unsubscribed_receivers_are_released() {
        let (sender, receiver) = watch::channel(0u32);
        let sub = Subscription::new(receiver);
        assert_eq!(sender.receiver_count(), 1);

        sub.unsubscribe();
        assert_eq!(sender.receiver_count(), 0);
    }
}
