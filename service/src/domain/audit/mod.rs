use std::collections::BTreeMap;

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use syllabus_common::{
    AuditAction, AuditRecord, AuditStatistics, NewAuditRecord, RequestContext, Role, SyllabusId,
    SyllabusStatus, UNKNOWN_LABEL, USER_AGENT_MAX_LEN, Username,
};

use crate::domain::ports::{AuditStore, Directory, Page, StoreError};

/// An action about to enter the ledger, before actor-role resolution and
/// serialization of the extras.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub syllabus_id: Option<SyllabusId>,
    pub action: AuditAction,
    pub performed_by: Username,
    pub old_status: Option<SyllabusStatus>,
    pub new_status: Option<SyllabusStatus>,
    pub comments: Option<String>,
    pub changed_fields: Option<BTreeMap<String, String>>,
    pub additional_data: Option<serde_json::Value>,
}

/// Best-effort ledger writer. `record` runs in its own unit of work and
/// cannot fail the caller: every error is logged and dropped. Losing an
/// audit row is accepted; losing business data is not.
#[derive(Clone)]
pub struct AuditRecorder<D, A>
where
    D: Directory,
    A: AuditStore,
{
    directory: D,
    store: A,
}

impl<D, A> AuditRecorder<D, A>
where
    D: Directory,
    A: AuditStore,
{
    pub fn new(directory: D, store: A) -> Self {
        Self { directory, store }
    }

    pub async fn record(&self, entry: AuditEntry, context: &RequestContext) {
        let action = entry.action.clone();
        let actor = entry.performed_by.clone();
        let syllabus = entry.syllabus_id;

        if let Err(err) = self.write(entry, context).await {
            tracing::error!(
                %action,
                %actor,
                syllabus = ?syllabus.map(|s| s.0),
                "failed to write audit log entry: {:#}",
                err
            );
        }
    }

    async fn write(&self, entry: AuditEntry, context: &RequestContext) -> anyhow::Result<()> {
        let role_label = match self.directory.resolve_user(&entry.performed_by).await {
            Ok(Some(user)) => Role::primary(&user.roles)
                .map(|role| role.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            Ok(None) => UNKNOWN_LABEL.to_string(),
            Err(err) => {
                tracing::warn!("could not resolve actor role for audit entry: {:?}", err);
                UNKNOWN_LABEL.to_string()
            }
        };

        let changed_fields = entry
            .changed_fields
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let additional_data = entry
            .additional_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let record = NewAuditRecord {
            syllabus_id: entry.syllabus_id,
            action_type: entry.action.as_str().to_string(),
            performed_by: entry.performed_by.to_string(),
            performed_by_role: role_label,
            old_status: entry.old_status.map(|s| s.as_str().to_string()),
            new_status: entry.new_status.map(|s| s.as_str().to_string()),
            comments: entry.comments,
            changed_fields,
            ip_address: context
                .ip_address
                .clone()
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            user_agent: context
                .user_agent
                .as_deref()
                .map(truncate_user_agent)
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            recorded_at: Utc::now(),
            additional_data,
        };

        self.store
            .insert(record)
            .await
            .map_err(|err| anyhow!("audit insert failed: {:?}", err))
    }

    // Read side: plain filters over the ledger.

    pub async fn list(&self, page: Page) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.list(page).await
    }

    pub async fn logs_by_syllabus(&self, id: SyllabusId) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.by_syllabus(id).await
    }

    pub async fn logs_by_actor(&self, username: &str) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.by_actor(username).await
    }

    pub async fn logs_by_action(
        &self,
        action: &AuditAction,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.by_action(action).await
    }

    pub async fn logs_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.in_range(start, end).await
    }

    pub async fn logs_by_academic_year(
        &self,
        year: &str,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        self.store.by_academic_year(year).await
    }

    pub async fn recent_logs(&self, days: i64) -> Result<Vec<AuditRecord>, StoreError> {
        let cutoff = Utc::now() - chrono::Duration::days(days);
        self.store.since(cutoff).await
    }

    pub async fn statistics(&self) -> Result<AuditStatistics, StoreError> {
        self.store.statistics(Utc::now()).await
    }
}

fn truncate_user_agent(user_agent: &str) -> String {
    user_agent.chars().take(USER_AGENT_MAX_LEN).collect()
}
