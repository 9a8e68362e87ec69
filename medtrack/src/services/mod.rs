mod adherence;
mod completion;
mod course;
mod family;

pub use adherence::{month_bounds, AdherenceService};
pub use completion::{CompletionReport, CompletionService, MarkTaken};
pub use course::CourseService;
pub use family::{hash_pin, validate_pin, FamilyService, SignUp};
