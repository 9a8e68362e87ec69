mod compliance;
mod course;
mod drug;
mod notification;
mod user;

pub use compliance::*;
pub use course::*;
pub use drug::*;
pub use notification::*;
pub use user::*;
