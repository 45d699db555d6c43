//! Test-suite editor state

mod autosave;
mod session;

pub use autosave::AutoSaveScheduler;
pub use session::EditorSession;
