use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("FetchError: {0}")]
    Fetch(#[from] FetchError),
    #[error("LoadMoreError: {0}")]
    LoadMore(#[from] LoadMoreError),
}

/// Failures of a single remote fetch. Every variant's display text is what
/// ends up in `SearchResult::message`, so the wording is part of the contract
/// (notably `Aborted`, which callers may match on verbatim).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("AJAX mode is enabled but no URL is configured")]
    MissingUrl,
    #[error("Request failed: {message}")]
    Network { message: String },
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },
    #[error("Failed to parse response: {message}")]
    Parse { message: String },
    #[error("Request aborted")]
    Aborted,
}

/// Precondition failures of `load_more`, each locally recoverable and each
/// with a distinct message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadMoreError {
    #[error("Load more requires an AJAX url")]
    NoAjax,
    #[error("Nothing has been searched yet")]
    NothingSearched,
    #[error("Pagination is not active for the current result")]
    NoPagination,
    #[error("A request is already in progress")]
    AlreadyLoading,
    #[error("No more pages to load")]
    NoMorePages,
}
