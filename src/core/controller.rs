use crate::api::client::AjaxClient;
use crate::api::config::{AjaxConfig, build_params};
use crate::api::response::parse_response;
use crate::core::items::{ItemSource, SelectItem};
use crate::core::state::{PaginationState, SearchResult};
use crate::error::{FetchError, LoadMoreError};
use crate::utils::text;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;

/// How a fetched page is applied to the item source.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ApplyMode {
    Replace,
    Append,
}

/// Search/pagination controller for a select widget.
///
/// Unifies local diacritic-insensitive filtering with remote AJAX search.
/// Every `search`/`load_more` call resolves to a [`SearchResult`] with a
/// `success` flag, never an `Err`, so UI callers can `await` them uniformly.
///
/// At most one remote request is tracked per controller: a newer `search`
/// aborts the pending one, and each request carries a generation id that is
/// re-checked before any state write-back, so superseded responses can never
/// corrupt pagination state.
pub struct SearchController {
    source: Arc<dyn ItemSource>,
    client: AjaxClient,
    ajax: Mutex<Option<AjaxConfig>>,
    state: Mutex<PaginationState>,
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl SearchController {
    pub fn new(source: Arc<dyn ItemSource>) -> crate::Result<Self> {
        Ok(Self {
            source,
            client: AjaxClient::new()?,
            ajax: Mutex::new(None),
            state: Mutex::new(PaginationState::default()),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        })
    }

    /// Run a search for `keyword` (trimmed before storage). Local filtering
    /// when no AJAX config is set, remote fetch of page 0 otherwise.
    pub async fn search(&self, keyword: &str) -> SearchResult {
        let keyword = keyword.trim().to_string();
        let config = self.lock_ajax().clone();

        match config {
            None => self.local_search(keyword),
            Some(config) if !config.has_url() => {
                SearchResult::fail(FetchError::MissingUrl.to_string())
            }
            Some(config) => {
                self.dispatch(config, keyword, 0, ApplyMode::Replace)
                    .await
            }
        }
    }

    /// Fetch the next page for the current keyword and append it to the
    /// result set. Fails fast (no queueing, no preemption) while a request
    /// is in flight; a fresh `search` is the only thing that preempts.
    pub async fn load_more(&self) -> SearchResult {
        let config = match self.lock_ajax().clone() {
            Some(config) if config.has_url() => config,
            _ => return SearchResult::fail(LoadMoreError::NoAjax.to_string()),
        };

        let (keyword, next_page) = {
            let state = self.lock_state();
            if state.current_keyword.is_empty() {
                return SearchResult::fail(LoadMoreError::NothingSearched.to_string());
            }
            if state.total_pages <= 1 {
                return SearchResult::fail(LoadMoreError::NoPagination.to_string());
            }
            if state.is_loading {
                return SearchResult::fail(LoadMoreError::AlreadyLoading.to_string());
            }
            if !state.has_more() {
                return SearchResult::fail(LoadMoreError::NoMorePages.to_string());
            }
            (state.current_keyword.clone(), state.current_page + 1)
        };

        self.dispatch(config, keyword, next_page, ApplyMode::Append)
            .await
    }

    /// Replace the AJAX configuration wholesale. `Some` without a url leaves
    /// the controller in AJAX mode with no usable endpoint (subsequent
    /// searches fail, they do not fall back to local filtering); `None`
    /// restores local mode. Pagination state is left untouched.
    pub fn set_ajax(&self, config: Option<AjaxConfig>) {
        *self.lock_ajax() = config;
    }

    /// True iff an AJAX config with a non-empty url is set.
    pub fn is_ajax(&self) -> bool {
        self.lock_ajax().as_ref().is_some_and(AjaxConfig::has_url)
    }

    /// Whether `keyword` differs from the stored keyword. Pure query used by
    /// callers to skip redundant UI churn.
    pub fn compare_search_trigger(&self, keyword: &str) -> bool {
        self.lock_state().current_keyword != keyword
    }

    /// "Erase the search box": clears the stored keyword and any visibility
    /// filtering, but intentionally leaves the pager alone (see
    /// `reset_pagination`).
    pub fn clear(&self) {
        self.lock_state().current_keyword.clear();
        self.source.clear_filter();
        self.source.set_not_found(false);
    }

    /// Reset the pager to its initial state. Safe while a request is in
    /// flight: the generation bump turns the pending result into an abort.
    pub fn reset_pagination(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.lock_in_flight().take() {
            previous.abort();
        }

        let mut state = self.lock_state();
        state.current_keyword.clear();
        state.current_page = 0;
        state.total_pages = 1;
        state.is_loading = false;
    }

    /// Read-only snapshot of the pagination state.
    pub fn pagination_state(&self) -> PaginationState {
        self.lock_state().clone()
    }

    fn local_search(&self, keyword: String) -> SearchResult {
        // A fresh search supersedes a pending remote request just like a
        // remote dispatch does: bump the generation so the stale resolution
        // reports itself aborted instead of clobbering this result.
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.lock_in_flight().take() {
            log::debug!("superseding in-flight request");
            previous.abort();
        }

        let items = self.source.items();
        let matched: Vec<String> = items
            .iter()
            .filter(|item| text::matches_keyword(&item.text, &keyword))
            .map(|item| item.value.clone())
            .collect();
        let has_results = !matched.is_empty();

        self.source.apply_filter(&matched);
        self.source.set_not_found(!has_results);

        let mut state = self.lock_state();
        state.current_keyword = keyword;
        state.current_page = 0;
        state.total_pages = 1;
        // Local filtering never loads, but a superseded remote request no
        // longer owns the flag, so it must not be left stuck on.
        state.is_loading = false;

        SearchResult::ok(has_results, false, false, 0)
    }

    async fn dispatch(
        &self,
        config: AjaxConfig,
        keyword: String,
        page: u32,
        mode: ApplyMode,
    ) -> SearchResult {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = self.lock_in_flight().take() {
            log::debug!("superseding in-flight request");
            previous.abort();
        }

        self.lock_state().is_loading = true;

        let params = build_params(&config, &keyword, page);
        let client = self.client.clone();
        let method = config.method;
        let url = config.url.clone().unwrap_or_default();
        let task = tokio::spawn(async move { client.fetch_json(method, url, params).await });
        *self.lock_in_flight() = Some(task.abort_handle());

        let outcome = match task.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_cancelled() => Err(FetchError::Aborted),
            Err(join_error) => Err(FetchError::Network {
                message: join_error.to_string(),
            }),
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            // A newer call owns the loading flag and the state now.
            return SearchResult::fail(FetchError::Aborted.to_string());
        }

        let value = match outcome {
            Ok(value) => value,
            Err(FetchError::Aborted) => {
                return SearchResult::fail(FetchError::Aborted.to_string());
            }
            Err(error) => {
                self.settle(generation);
                return SearchResult::fail(error.to_string());
            }
        };

        let parsed = match parse_response(&value) {
            Ok(parsed) => parsed,
            Err(error) => {
                self.settle(generation);
                return SearchResult::fail(error.to_string());
            }
        };

        let mut items = parsed.items;
        if config.keep_selected && mode == ApplyMode::Replace {
            merge_selected(self.source.as_ref(), &mut items);
        }
        let has_results = !items.is_empty();

        let current_page = parsed.page.unwrap_or(page);
        let total_pages = parsed.total_pages.unwrap_or(1).max(1);

        {
            let mut state = self.lock_state();
            if self.generation.load(Ordering::SeqCst) != generation {
                return SearchResult::fail(FetchError::Aborted.to_string());
            }

            match mode {
                ApplyMode::Replace => {
                    self.source.set_not_found(!has_results);
                    self.source.replace(items);
                }
                ApplyMode::Append => self.source.append(items),
            }

            state.current_keyword = keyword;
            state.current_page = current_page;
            state.total_pages = total_pages;
            state.is_loading = false;
        }
        self.lock_in_flight().take();

        SearchResult::ok(
            has_results,
            total_pages > 1,
            current_page + 1 < total_pages,
            current_page,
        )
    }

    /// Drop the loading flag after a settled fetch, unless a newer request
    /// has taken ownership of it in the meantime.
    fn settle(&self, generation: u64) {
        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) == generation {
            state.is_loading = false;
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PaginationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ajax(&self) -> MutexGuard<'_, Option<AjaxConfig>> {
        self.ajax.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Re-merge the source's selected items into a freshly fetched page so
/// selection survives a replace: survivors get their flag back, absentees are
/// re-appended.
fn merge_selected(source: &dyn ItemSource, items: &mut Vec<SelectItem>) {
    for selected in source.selected() {
        if let Some(existing) = items.iter_mut().find(|i| i.value == selected.value) {
            existing.selected = true;
        } else {
            items.push(selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::items::MemoryItemSource;

    fn fruit_controller() -> (Arc<MemoryItemSource>, SearchController) {
        let source = Arc::new(MemoryItemSource::from_texts(&["Apple", "Banana", "Cherry"]));
        let controller =
            SearchController::new(source.clone()).expect("controller creation failed");
        (source, controller)
    }

    #[tokio::test]
    async fn test_local_search_matches_substring() {
        let (source, controller) = fruit_controller();

        let result = controller.search("ban").await;
        assert!(result.success);
        assert!(result.has_results);
        assert!(!result.has_pagination);
        assert!(!result.has_more);
        assert_eq!(result.current_page, 0);

        let visible = source.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "Banana");
        assert!(!source.is_not_found());
    }

    #[tokio::test]
    async fn test_local_search_empty_keyword_matches_all() {
        let (source, controller) = fruit_controller();

        let result = controller.search("").await;
        assert!(result.success);
        assert!(result.has_results);
        assert_eq!(source.visible_items().len(), 3);
    }

    #[tokio::test]
    async fn test_local_search_no_match_sets_not_found() {
        let (source, controller) = fruit_controller();

        let result = controller.search("xyz").await;
        assert!(result.success);
        assert!(!result.has_results);
        assert!(source.visible_items().is_empty());
        assert!(source.is_not_found());
    }

    #[tokio::test]
    async fn test_local_search_is_diacritic_insensitive() {
        let source = Arc::new(MemoryItemSource::from_texts(&["Táo", "Chuối"]));
        let controller =
            SearchController::new(source.clone()).expect("controller creation failed");

        let result = controller.search("tao").await;
        assert!(result.has_results);
        let visible = source.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "Táo");
    }

    #[tokio::test]
    async fn test_local_search_tolerates_missing_text() {
        let source = Arc::new(MemoryItemSource::new(vec![
            SelectItem::new("1", ""),
            SelectItem::new("2", "Banana"),
        ]));
        let controller =
            SearchController::new(source.clone()).expect("controller creation failed");

        let result = controller.search("ban").await;
        assert!(result.success);
        assert_eq!(source.visible_items().len(), 1);
    }

    #[tokio::test]
    async fn test_local_search_trims_and_stores_keyword() {
        let (_, controller) = fruit_controller();

        let result = controller.search("  ban  ").await;
        assert!(result.has_results);
        assert_eq!(controller.pagination_state().current_keyword, "ban");
    }

    #[tokio::test]
    async fn test_local_search_is_idempotent() {
        let (source, controller) = fruit_controller();

        let first = controller.search("ban").await;
        let second = controller.search("ban").await;
        assert_eq!(first, second);
        assert_eq!(source.visible_items().len(), 1);
    }

    #[tokio::test]
    async fn test_local_search_never_sets_loading() {
        let (_, controller) = fruit_controller();
        controller.search("ban").await;
        assert!(!controller.pagination_state().is_loading);
    }

    #[tokio::test]
    async fn test_ajax_config_without_url_fails_without_state_change() {
        let (_, controller) = fruit_controller();
        controller.set_ajax(Some(AjaxConfig::default()));
        assert!(!controller.is_ajax());

        let before = controller.pagination_state();
        let result = controller.search("ban").await;
        assert!(!result.success);
        assert!(
            result
                .message
                .as_deref()
                .is_some_and(|m| m.contains("no URL"))
        );
        assert_eq!(controller.pagination_state(), before);
    }

    #[tokio::test]
    async fn test_set_ajax_none_restores_local_mode() {
        let (_, controller) = fruit_controller();
        controller.set_ajax(Some(AjaxConfig::new("https://example.test/search")));
        assert!(controller.is_ajax());

        controller.set_ajax(None);
        assert!(!controller.is_ajax());
        assert!(controller.search("ban").await.success);
    }

    #[tokio::test]
    async fn test_compare_search_trigger() {
        let (_, controller) = fruit_controller();
        assert!(controller.compare_search_trigger("ban"));

        controller.search("ban").await;
        assert!(!controller.compare_search_trigger("ban"));
        assert!(controller.compare_search_trigger("cher"));
    }

    #[tokio::test]
    async fn test_clear_resets_keyword_and_filter_only() {
        let (source, controller) = fruit_controller();
        controller.search("xyz").await;
        assert!(source.is_not_found());

        controller.clear();
        assert_eq!(controller.pagination_state().current_keyword, "");
        assert_eq!(source.visible_items().len(), 3);
        assert!(!source.is_not_found());
    }

    #[tokio::test]
    async fn test_reset_pagination_restores_defaults() {
        let (_, controller) = fruit_controller();
        controller.search("ban").await;

        controller.reset_pagination();
        let state = controller.pagination_state();
        assert_eq!(state, PaginationState::default());
    }

    #[tokio::test]
    async fn test_load_more_requires_ajax() {
        let (_, controller) = fruit_controller();
        let result = controller.load_more().await;
        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("Load more requires an AJAX url")
        );
    }

    #[tokio::test]
    async fn test_load_more_requires_a_prior_search() {
        let (_, controller) = fruit_controller();
        controller.set_ajax(Some(AjaxConfig::new("https://example.test/search")));

        let result = controller.load_more().await;
        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("Nothing has been searched yet")
        );
    }

    #[test]
    fn test_merge_selected_restores_flag_and_appends_absentees() {
        let source = MemoryItemSource::from_texts(&["Apple", "Banana"]);
        source.set_selected("Apple", true);
        source.set_selected("Banana", true);

        // Fresh page contains Apple (unselected) but not Banana.
        let mut items = vec![SelectItem::new("Apple", "Apple")];
        merge_selected(&source, &mut items);

        assert_eq!(items.len(), 2);
        assert!(items[0].selected);
        assert_eq!(items[1].value, "Banana");
        assert!(items[1].selected);
    }
}
