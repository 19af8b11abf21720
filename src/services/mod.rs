// Service exports
pub mod notifications;
pub mod postgres;
pub mod registry;
pub mod whatsapp;

pub use notifications::{Dispatcher, NotificationDispatcher};
pub use postgres::PostgresClient;
pub use registry::{DonorRegistry, InMemoryStore, RegistryError, RequestStore, StoreError};
pub use whatsapp::{format_emergency_alert, NotifyError, TwilioCredentials, WhatsAppClient};
