//! v1 API Data Transfer Objects.
//!
//! These types define the wire format for the v1 REST API. They are kept
//! separate from the domain models in `src/models/` and convert from them.

pub mod courses;
pub mod drugs;
pub mod notifications;
pub mod reports;
pub mod users;

pub use courses::*;
pub use drugs::*;
pub use notifications::*;
pub use reports::*;
pub use users::*;
