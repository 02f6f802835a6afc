#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("tree order must be at least 2, got {0}")]
    InvalidOrder(usize),
}
