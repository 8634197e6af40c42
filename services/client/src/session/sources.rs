//! services/client/src/session/sources.rs
//!
//! The source manager: the ordered collection of uploaded/pasted study
//! materials, the selection set over them, and the durable mirror of that
//! selection under the `selectedSources` slot.

use std::sync::Arc;

use study_assistant_core::domain::Source;
use study_assistant_core::selection::SelectionSet;
use tracing::debug;

use crate::session::state::{ActionError, AppState};

/// Uploads above this size are rejected client-side, before any network call.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const SELECTED_SOURCES_KEY: &str = "selectedSources";

const ACCEPTED_EXTENSIONS: [&str; 3] = ["pdf", "ppt", "pptx"];

/// One file picked for upload.
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub struct SourceManager {
    state: Arc<AppState>,
    user_id: i64,
    sources: Vec<Source>,
    selection: SelectionSet,
}

impl SourceManager {
    pub fn new(state: Arc<AppState>, user_id: i64) -> Self {
        Self {
            state,
            user_id,
            sources: Vec::new(),
            selection: SelectionSet::new(),
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Fetches the user's sources and reinstates the persisted selection,
    /// intersected with the live ids so stale entries are dropped.
    pub async fn load(&mut self, token: &str) -> Result<(), ActionError> {
        self.sources = self
            .state
            .source_api
            .list_sources(token, self.user_id)
            .await
            .map_err(|e| self.state.map_port_error(e))?;

        let persisted = self
            .state
            .durable_store
            .get(SELECTED_SOURCES_KEY)
            .unwrap_or_default();
        self.selection = SelectionSet::from_json(&persisted);
        self.selection
            .reconcile(self.sources.iter().map(|s| s.id.as_str()));
        self.mirror_selection();
        Ok(())
    }

    fn mirror_selection(&self) {
        self.state
            .durable_store
            .put(SELECTED_SOURCES_KEY, &self.selection.to_json());
    }

    /// Validates a file before upload. Returns the rejection message, if any.
    fn reject_reason(file: &UploadFile) -> Option<String> {
        if file.bytes.len() > MAX_UPLOAD_BYTES {
            return Some(format!("{}: file exceeds the 10 MB limit", file.name));
        }
        let accepted = file
            .name
            .rsplit('.')
            .next()
            .map(|ext| ACCEPTED_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
            .unwrap_or(false);
        if !accepted {
            return Some(format!("{}: only PDF and PowerPoint files are accepted", file.name));
        }
        None
    }

    /// Uploads a batch of files. Rejected or failed files accumulate an error
    /// and the batch continues; accepted files are sent strictly one at a
    /// time, each awaited before the next starts. Session expiry aborts the
    /// whole batch.
    pub async fn upload(
        &mut self,
        token: &str,
        files: Vec<UploadFile>,
    ) -> Result<Vec<String>, ActionError> {
        let mut errors = Vec::new();
        for file in files {
            if let Some(reason) = Self::reject_reason(&file) {
                errors.push(reason);
                continue;
            }
            let result = self
                .state
                .source_api
                .upload_document(token, self.user_id, &file.name, file.bytes)
                .await;
            match result {
                Ok(source) => {
                    self.selection.insert(&source.id);
                    self.sources.push(source);
                    self.mirror_selection();
                }
                Err(error) => match self.state.map_port_error(error) {
                    ActionError::SessionExpired => return Err(ActionError::SessionExpired),
                    ActionError::Message(message) => {
                        errors.push(format!("{}: {}", file.name, message));
                    }
                },
            }
        }
        Ok(errors)
    }

    /// Persists pasted text as a source. Blank input is a no-op.
    pub async fn add_text(&mut self, token: &str, content: &str) -> Result<(), ActionError> {
        if content.trim().is_empty() {
            return Ok(());
        }
        let source = self
            .state
            .source_api
            .create_text_source(token, self.user_id, content)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.selection.insert(&source.id);
        self.sources.push(source);
        self.mirror_selection();
        Ok(())
    }

    pub fn toggle_selection(&mut self, id: &str) {
        self.selection.toggle(id);
        self.mirror_selection();
    }

    /// Select-all with toggle semantics: clears when everything is already
    /// selected, selects everything otherwise.
    pub fn select_all(&mut self) {
        let ids: Vec<String> = self.sources.iter().map(|s| s.id.clone()).collect();
        self.selection.toggle_all(ids.iter().map(String::as_str));
        self.mirror_selection();
    }

    /// Deletes a source on the backend, then locally and from the selection.
    pub async fn delete(&mut self, token: &str, id: &str) -> Result<(), ActionError> {
        self.state
            .source_api
            .delete_source(token, id)
            .await
            .map_err(|e| self.state.map_port_error(e))?;
        self.sources.retain(|s| s.id != id);
        self.selection.remove(id);
        self.mirror_selection();
        debug!("Deleted source {}", id);
        Ok(())
    }

    /// The concatenated content of every selected source, in collection
    /// order, joined with a blank line.
    pub fn selected_content(&self) -> String {
        self.sources
            .iter()
            .filter(|s| self.selection.contains(&s.id))
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
