/// Domain errors raised before a recognition run is attempted.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The caller supplied no usable input.
    #[error("{0}")]
    InvalidInput(String),
}
