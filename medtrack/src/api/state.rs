use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::drugs::{DrugInfoProvider, DrugInfoSource, GenerativeDrugInfo, RegistryClient};
use crate::error::Result;
use crate::intelligence::{ScanExtractor, ScanService};
use crate::llm::LlmProvider;
use crate::notify::{MessageTransport, Notifier};
use crate::services::{AdherenceService, CompletionService, CourseService, FamilyService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub llm: LlmProvider,
    pub courses: CourseService,
    pub adherence: AdherenceService,
    pub completion: CompletionService,
    pub family: FamilyService,
    pub notifier: Notifier,
    pub drugs: DrugInfoProvider,
    pub scans: ScanService,
}

impl AppState {
    /// Wires every service onto one backend. `transport` is `None` when push
    /// delivery is switched off.
    pub fn new<B: DatabaseBackend + 'static>(
        config: Config,
        backend: Arc<B>,
        llm: LlmProvider,
        transport: Option<Arc<dyn MessageTransport>>,
    ) -> Result<Self> {
        let config = Arc::new(config);

        let adherence = AdherenceService::new(backend.clone());
        let courses = CourseService::new(backend.clone(), config.course.clone());
        let notifier = Notifier::new(backend.clone(), backend.clone(), transport);
        let completion = CompletionService::new(backend.clone(), backend.clone(), notifier.clone());
        let family = FamilyService::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            adherence.clone(),
        );

        let mut sources: Vec<Arc<dyn DrugInfoSource>> = Vec::new();
        if let Some(registry) = &config.drug_registry {
            sources.push(Arc::new(RegistryClient::new(registry)?));
        }
        if llm.is_available() {
            sources.push(Arc::new(GenerativeDrugInfo::new(llm.clone())));
        }
        let drugs = DrugInfoProvider::new(sources);
        let scans = ScanService::new(ScanExtractor::new(llm.clone()), drugs.clone());

        Ok(Self {
            config,
            db: backend,
            llm,
            courses,
            adherence,
            completion,
            family,
            notifier,
            drugs,
            scans,
        })
    }
}
