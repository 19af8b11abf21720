use async_trait::async_trait;
use std::sync::Arc;

use crate::models::NotificationKind;
use crate::services::registry::RequestStore;
use crate::services::whatsapp::{NotifyError, WhatsAppClient};

/// Delivers messages to donors
///
/// Callers treat delivery as fire-and-forget: errors are reported so they
/// can be logged, never retried.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// In-app message addressed by user id
    async fn notify_user(&self, user_id: i64, message: &str) -> Result<(), NotifyError>;

    /// WhatsApp message addressed by phone number
    async fn send_whatsapp(&self, phone: &str, message: &str) -> Result<(), NotifyError>;
}

/// Dispatcher writing in-app messages to the request store and WhatsApp
/// messages through a [`WhatsAppClient`]
pub struct Dispatcher {
    inbox: Arc<dyn RequestStore>,
    whatsapp: WhatsAppClient,
}

impl Dispatcher {
    pub fn new(inbox: Arc<dyn RequestStore>, whatsapp: WhatsAppClient) -> Self {
        Self { inbox, whatsapp }
    }
}

#[async_trait]
impl NotificationDispatcher for Dispatcher {
    async fn notify_user(&self, user_id: i64, message: &str) -> Result<(), NotifyError> {
        self.inbox
            .record_notification(user_id, message, NotificationKind::Emergency)
            .await
            .map_err(|e| NotifyError::InboxError(e.to_string()))
    }

    async fn send_whatsapp(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        self.whatsapp.send(phone, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::registry::InMemoryStore;

    #[tokio::test]
    async fn test_notify_user_writes_inbox() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = Dispatcher::new(store.clone(), WhatsAppClient::log_only());

        dispatcher.notify_user(12, "Emergency! A+ blood needed urgently.").await.unwrap();
        dispatcher.send_whatsapp("+911234567890", "hello").await.unwrap();

        let inbox = store.notifications().await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].user_id, 12);
        assert_eq!(inbox[0].message, "Emergency! A+ blood needed urgently.");
        assert_eq!(inbox[0].kind, NotificationKind::Emergency);
        assert_eq!(inbox[0].kind.as_str(), "emergency");
    }
}
