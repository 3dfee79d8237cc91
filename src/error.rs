/// Failure of a dispatch operation.
///
/// Both variants display only the underlying error chain, so callers see one
/// generic failure whichever collaborator broke.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0:#}")]
    Model(anyhow::Error),

    #[error("{0:#}")]
    Persistence(anyhow::Error),
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Model(_) => "model invocation",
            DispatchError::Persistence(_) => "persistence",
        }
    }
}
