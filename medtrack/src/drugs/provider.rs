use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::DrugInfo;

/// A place drug information can be looked up by product name.
#[async_trait]
pub trait DrugInfoSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Matches for `drug_name`, best first. Empty when nothing matched.
    async fn lookup(&self, drug_name: &str) -> Result<Vec<DrugInfo>>;
}

/// Tries each source in order and returns the first non-empty answer.
#[derive(Clone, Default)]
pub struct DrugInfoProvider {
    sources: Vec<Arc<dyn DrugInfoSource>>,
}

impl DrugInfoProvider {
    pub fn new(sources: Vec<Arc<dyn DrugInfoSource>>) -> Self {
        Self { sources }
    }

    pub fn is_available(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Source failures are logged and the next source is tried.
    pub async fn search(&self, drug_name: &str) -> Vec<DrugInfo> {
        let drug_name = drug_name.trim();
        if drug_name.is_empty() {
            return Vec::new();
        }

        for source in &self.sources {
            match source.lookup(drug_name).await {
                Ok(found) if !found.is_empty() => {
                    debug!(source = source.name(), count = found.len(), "Drug info found");
                    return found;
                }
                Ok(_) => debug!(source = source.name(), drug = drug_name, "No drug info"),
                Err(e) => warn!(
                    source = source.name(),
                    drug = drug_name,
                    error = %e,
                    "Drug info lookup failed"
                ),
            }
        }
        Vec::new()
    }

    pub async fn best_match(&self, drug_name: &str) -> Option<DrugInfo> {
        self.search(drug_name).await.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MedtrackError;

    struct Fixed(&'static str, Option<Vec<DrugInfo>>);

    #[async_trait]
    impl DrugInfoSource for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn lookup(&self, _drug_name: &str) -> Result<Vec<DrugInfo>> {
            self.1
                .clone()
                .ok_or_else(|| MedtrackError::DrugRegistry("down".to_string()))
        }
    }

    fn info(name: &str) -> DrugInfo {
        DrugInfo {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_falls_through_empty_and_failing_sources() {
        let provider = DrugInfoProvider::new(vec![
            Arc::new(Fixed("failing", None)),
            Arc::new(Fixed("empty", Some(vec![]))),
            Arc::new(Fixed("answer", Some(vec![info("Tylenol")]))),
        ]);

        assert_eq!(provider.best_match("tylenol").await.unwrap().name, "Tylenol");
    }

    #[tokio::test]
    async fn test_no_sources_returns_nothing() {
        let provider = DrugInfoProvider::default();
        assert!(!provider.is_available());
        assert!(provider.search("Tylenol").await.is_empty());
        assert!(provider.search("   ").await.is_empty());
    }
}
