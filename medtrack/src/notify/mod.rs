mod message;
mod notifier;
mod telegram;

pub use message::{completion_message, summarize_drugs, MAX_LISTED_DRUGS};
pub use notifier::{DeliveryOutcome, Notifier, NotifyOutcome};
pub use telegram::{MessageTransport, TelegramTransport};
