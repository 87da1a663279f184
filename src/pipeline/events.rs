use std::path::PathBuf;

/// Messages streamed from the batch worker to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Log(String),
    Progress { done: usize, total: usize },
    /// Output path on success, error text otherwise.
    Finished(Result<PathBuf, String>),
}
