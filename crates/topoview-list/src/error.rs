use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("page {page} is out of bounds (1..={max_page})")]
    PageOutOfBounds { page: usize, max_page: usize },
    #[error("fetch failed: {0}")]
    Fetch(String),
}
