pub mod analytics;
pub mod forms;
pub mod submissions;
pub mod users;
pub mod webhook_deliveries;
pub mod webhooks;
