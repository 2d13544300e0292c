/// Pagination state owned by the controller and mutated only by it.
/// Consumers read cloned snapshots via `SearchController::pagination_state`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    /// Last keyword searched; empty means "no filter".
    pub current_keyword: String,
    /// Zero-based index of the last successfully loaded page.
    pub current_page: u32,
    /// Total known pages; 1 when pagination is not in effect.
    pub total_pages: u32,
    /// True exactly while an in-flight fetch has not yet settled.
    pub is_loading: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_keyword: String::new(),
            current_page: 0,
            total_pages: 1,
            is_loading: false,
        }
    }
}

impl PaginationState {
    /// Whether a page beyond the current one exists.
    pub fn has_more(&self) -> bool {
        self.current_page + 1 < self.total_pages
    }
}

/// Outcome of a `search` or `load_more` call. Never an `Err`: failures are
/// reported through `success == false` plus `message` so UI code can treat
/// every call uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub success: bool,
    pub has_results: bool,
    pub has_pagination: bool,
    pub has_more: bool,
    pub current_page: u32,
    pub message: Option<String>,
}

impl SearchResult {
    pub fn ok(has_results: bool, has_pagination: bool, has_more: bool, current_page: u32) -> Self {
        Self {
            success: true,
            has_results,
            has_pagination,
            has_more,
            current_page,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            has_results: false,
            has_pagination: false,
            has_more: false,
            current_page: 0,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = PaginationState::default();
        assert_eq!(state.current_keyword, "");
        assert_eq!(state.current_page, 0);
        assert_eq!(state.total_pages, 1);
        assert!(!state.is_loading);
        assert!(!state.has_more());
    }

    #[test]
    fn test_has_more() {
        let mut state = PaginationState {
            total_pages: 3,
            ..Default::default()
        };
        assert!(state.has_more());
        state.current_page = 1;
        assert!(state.has_more());
        state.current_page = 2;
        assert!(!state.has_more());
    }

    #[test]
    fn test_result_constructors() {
        let result = SearchResult::ok(true, true, false, 2);
        assert!(result.success);
        assert!(result.message.is_none());
        assert_eq!(result.current_page, 2);

        let result = SearchResult::fail("boom");
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("boom"));
    }
}
