//! NamespaceSelector - データストアの名前空間を選ぶ入力フィールド
//!
//! # 振る舞い
//! - データストアが決まるまでは無効（disabled）
//! - 入力は読み込み済みの一覧に含まれる値だけを受け付ける
//! - 空文字列はルート名前空間を表し、常に有効

use std::sync::Arc;

use tracing::{debug, warn};

use super::labels::Labels;
use crate::domain::{ApiError, NamespaceEntry};
use crate::ports::{ApiClient, ApiPath};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamespaceError {
    #[error("namespace selection is disabled: no datastore selected")]
    Disabled,

    #[error("namespace '{ns}' does not exist on datastore '{store}'")]
    NotInList { ns: String, store: String },
}

pub struct NamespaceSelector {
    api: Arc<dyn ApiClient>,
    labels: Labels,
    datastore: Option<String>,
    entries: Vec<NamespaceEntry>,
    value: String,
}

impl NamespaceSelector {
    pub fn new(api: Arc<dyn ApiClient>, labels: Labels) -> Self {
        Self {
            api,
            labels,
            datastore: None,
            entries: Vec::new(),
            value: String::new(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.datastore.is_none()
    }

    pub fn datastore(&self) -> Option<&str> {
        self.datastore.as_deref()
    }

    /// Where the namespace list is loaded from, if enabled.
    pub fn source_path(&self) -> Option<ApiPath> {
        self.datastore.as_deref().map(ApiPath::namespaces)
    }

    /// Point the field at `datastore` (enable, reload, revalidate), or
    /// disable it with `None`.
    ///
    /// Returns the validation result of the current value against the new
    /// list. A failed reload leaves the list empty.
    pub async fn set_datastore(
        &mut self,
        datastore: Option<&str>,
    ) -> Result<Result<(), NamespaceError>, ApiError> {
        match datastore {
            None => {
                self.datastore = None;
                self.entries.clear();
                Ok(Err(NamespaceError::Disabled))
            }
            Some(store) => {
                self.datastore = Some(store.to_string());
                self.reload().await?;
                Ok(self.validate())
            }
        }
    }

    pub async fn reload(&mut self) -> Result<(), ApiError> {
        let Some(store) = self.datastore.clone() else {
            return Ok(());
        };
        match self.api.list_namespaces(&store).await {
            Ok(entries) => {
                debug!(%store, count = entries.len(), "namespaces loaded");
                self.entries = entries;
                Ok(())
            }
            Err(err) => {
                warn!(%store, error = %err, "loading namespaces failed");
                self.entries.clear();
                Err(err)
            }
        }
    }

    pub fn entries(&self) -> &[NamespaceEntry] {
        &self.entries
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn display_value(&self) -> &str {
        if self.value.is_empty() {
            &self.labels.root
        } else {
            &self.value
        }
    }

    pub fn clear_trigger_visible(&self) -> bool {
        !self.value.is_empty()
    }

    /// Reset to the root namespace.
    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn validate(&self) -> Result<(), NamespaceError> {
        let Some(store) = &self.datastore else {
            return Err(NamespaceError::Disabled);
        };
        if self.value.is_empty() || self.entries.iter().any(|e| e.ns == self.value) {
            return Ok(());
        }
        Err(NamespaceError::NotInList {
            ns: self.value.clone(),
            store: store.clone(),
        })
    }

    /// Value to submit. Disabled fields submit nothing.
    pub fn submit(&self) -> Result<Option<String>, NamespaceError> {
        if self.is_disabled() {
            return Ok(None);
        }
        self.validate()?;
        Ok(Some(self.value.clone()))
    }

    /// Loaded entries whose name contains `query`.
    pub fn suggestions(&self, query: &str) -> Vec<&NamespaceEntry> {
        self.entries
            .iter()
            .filter(|e| e.ns.contains(query))
            .collect()
    }
}
