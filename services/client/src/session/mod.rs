pub mod artifacts;
pub mod auth;
pub mod chat;
pub mod history;
pub mod sources;
pub mod state;

#[cfg(test)]
pub(crate) mod mock;

pub use artifacts::{ActiveTab, ArtifactGenerator};
pub use auth::{AuthFlow, AuthMode};
pub use chat::ChatPanel;
pub use history::HistoryBrowser;
pub use sources::{SourceManager, UploadFile};
pub use state::{ActionError, AppState};
