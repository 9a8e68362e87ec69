mod generative;
mod provider;
mod registry;

pub use generative::GenerativeDrugInfo;
pub use provider::{DrugInfoProvider, DrugInfoSource};
pub use registry::RegistryClient;
