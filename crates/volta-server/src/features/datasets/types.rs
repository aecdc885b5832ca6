//! Shared dataset row and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::{self, AccessLevel, DatasetVisibility, Principal};

/// One stored dataset version, as persisted
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatasetRow {
    pub id: Uuid,
    pub lineage_id: Uuid,
    pub version: i32,
    pub file_name: String,
    pub content: String,
    pub checksum: String,
    pub description: Option<String>,
    pub changes: Option<String>,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub data_type: Option<String>,
    pub category_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub method: Option<String>,
    pub electrode_type: Option<String>,
    pub instrument: Option<String>,
    pub is_public: bool,
    pub delimiter: String,
    pub downloads_count: i64,
}

impl DatasetRow {
    pub fn visibility(&self) -> DatasetVisibility {
        DatasetVisibility {
            owner: self.uploaded_by,
            is_public: self.is_public,
        }
    }

    /// Resolve the caller's access level, loading the owning project's
    /// state when the dataset belongs to one.
    pub async fn resolve_access(
        &self,
        pool: &PgPool,
        principal: &Principal,
    ) -> Result<AccessLevel, sqlx::Error> {
        let project = super::fetch_project_context(pool, self.project_id).await?;
        Ok(access::decide(principal, &self.visibility(), project.as_ref()))
    }
}

/// One entry in a dataset's version history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub id: Uuid,
    pub version: i32,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
}
