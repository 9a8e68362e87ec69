pub mod courses;
pub mod drugs;
pub(crate) mod health;
pub mod notifications;
pub mod reports;
pub mod users;

pub use health::health_check;
