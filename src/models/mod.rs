pub mod form;
pub mod submission;
pub mod user;
pub mod webhook;
pub mod webhook_delivery;

pub use form::{Form, FormSummary};
pub use submission::Submission;
pub use user::User;
pub use webhook::Webhook;
pub use webhook_delivery::WebhookDelivery;
