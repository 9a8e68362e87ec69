use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::{FamilyGraph, RecordStore};
use crate::error::{MedtrackError, Result};
use crate::models::{DoseState, NotificationCategory};
use crate::notify::{completion_message, Notifier};

/// Caller-supplied context for marking a dose-day taken.
#[derive(Debug, Clone)]
pub struct MarkTaken {
    pub record_id: String,
    pub patient_name: String,
    pub drug_names: Vec<String>,
    /// Account whose observers are told. `None` skips notification.
    pub owner_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionReport {
    pub record_id: String,
    pub recipients: u32,
    pub notifications_written: u32,
    pub deliveries_attempted: u32,
}

/// Marks dose-days taken and tells linked observers.
#[derive(Clone)]
pub struct CompletionService {
    records: Arc<dyn RecordStore>,
    family: Arc<dyn FamilyGraph>,
    notifier: Notifier,
}

impl CompletionService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        family: Arc<dyn FamilyGraph>,
        notifier: Notifier,
    ) -> Self {
        Self {
            records,
            family,
            notifier,
        }
    }

    /// Builds the context for `mark_taken` from the stored record.
    pub async fn context_for(&self, record_id: &str) -> Result<MarkTaken> {
        let record = self
            .records
            .get_record(record_id)
            .await?
            .ok_or_else(|| MedtrackError::NotFound(format!("Record {record_id} not found")))?;

        Ok(MarkTaken {
            record_id: record.id,
            patient_name: record.patient_name,
            drug_names: record.drug_names,
            owner_user_id: record.owner_user_id,
        })
    }

    /// Sets the record's taken flag, then notifies observers of the owner.
    ///
    /// The flag update decides success. Notification runs only after it
    /// succeeds and its failures are logged, never returned.
    pub async fn mark_taken(&self, request: MarkTaken) -> Result<CompletionReport> {
        let updated = self
            .records
            .set_dose_state(&request.record_id, DoseState::Pending.take())
            .await?;
        if !updated {
            return Err(MedtrackError::NotFound(format!(
                "Record {} not found",
                request.record_id
            )));
        }
        info!("Record {} marked taken", request.record_id);

        let mut report = CompletionReport {
            record_id: request.record_id.clone(),
            recipients: 0,
            notifications_written: 0,
            deliveries_attempted: 0,
        };

        let Some(owner) = request.owner_user_id.as_deref() else {
            return Ok(report);
        };

        let observers = match self.family.linked_observers(owner).await {
            Ok(observers) => observers,
            Err(e) => {
                warn!(owner, error = %e, "Failed to resolve observers, skipping notification");
                return Ok(report);
            }
        };

        let message = completion_message(
            &request.patient_name,
            &request.drug_names,
            Local::now().time(),
        );

        for observer in &observers {
            let outcome = self
                .notifier
                .notify(&observer.user_id, &message, NotificationCategory::Medication)
                .await;
            report.recipients += 1;
            if outcome.written() {
                report.notifications_written += 1;
            }
            if outcome.delivery.attempted() {
                report.deliveries_attempted += 1;
            }
        }

        info!(
            "Completion of {} sent to {} observers ({} written, {} pushed)",
            request.record_id,
            report.recipients,
            report.notifications_written,
            report.deliveries_attempted
        );

        Ok(report)
    }
}
