mod dates;
mod scan;

pub use dates::parse_flexible_date;
pub use scan::{ScanExtractor, ScanService};
