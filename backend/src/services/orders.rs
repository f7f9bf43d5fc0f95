//! Queue of online orders waiting to be picked up by the dashboard

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use uuid::Uuid;

/// Order placed through the online store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingOrder {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub items: Vec<PendingOrderItem>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
}

/// FIFO of pending orders shared through application state
#[derive(Debug, Default)]
pub struct PendingOrderQueue {
    orders: Mutex<VecDeque<PendingOrder>>,
    notify: Notify,
}

impl PendingOrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn orders(&self) -> std::sync::MutexGuard<'_, VecDeque<PendingOrder>> {
        self.orders.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue an order and wake any waiting consumers
    pub fn push(&self, order: PendingOrder) {
        tracing::info!("Queued online order {} from {}", order.id, order.customer_name);
        self.orders().push_back(order);
        self.notify.notify_waiters();
    }

    /// Take every queued order, oldest first
    pub fn drain(&self) -> Vec<PendingOrder> {
        self.orders().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.orders().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least one order is queued or the timeout passes
    ///
    /// Returns whether orders are available.
    pub async fn wait_for_order(&self, timeout: Duration) -> bool {
        // Register before checking so a push in between is not missed
        let notified = self.notify.notified();
        if !self.is_empty() {
            return true;
        }
        if tokio::time::timeout(timeout, notified).await.is_err() {
            return false;
        }
        !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn order(customer: &str) -> PendingOrder {
        PendingOrder {
            id: Uuid::new_v4(),
            customer_name: customer.to_string(),
            customer_phone: None,
            items: vec![PendingOrderItem {
                product_id: Uuid::new_v4(),
                product_name: "Cetirizine 10mg".to_string(),
                quantity: 2,
            }],
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_drain_is_fifo_and_empties_queue() {
        let queue = PendingOrderQueue::new();
        queue.push(order("Asha"));
        queue.push(order("Ravi"));
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0].customer_name, "Asha");
        assert_eq!(drained[1].customer_name, "Ravi");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wait_returns_immediately_when_orders_exist() {
        let queue = PendingOrderQueue::new();
        queue.push(order("Asha"));
        assert!(tokio_test::block_on(queue.wait_for_order(Duration::from_millis(1))));
    }

    #[tokio::test]
    async fn test_wait_wakes_on_push() {
        let queue = Arc::new(PendingOrderQueue::new());
        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.wait_for_order(Duration::from_secs(5)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.push(order("Ravi"));

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_times_out_when_empty() {
        let queue = PendingOrderQueue::new();
        assert!(!queue.wait_for_order(Duration::from_millis(10)).await);
    }
}
