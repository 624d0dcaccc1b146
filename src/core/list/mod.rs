//! Incremental list controller.
//!
//! Drives a client-side list that pages in on scroll (browse mode) or shows a
//! filtered, unpaged result set (search mode). The controller never performs
//! I/O itself: commands hand back a [`FetchRequest`], the caller runs it
//! against a store, and the outcome goes back through [`ListController::complete`].
//!
//! Every request carries the version that was current when it was issued.
//! Issuing a newer request bumps the version, so whichever response arrives
//! for an older one is dropped on completion instead of overwriting fresher
//! state. Nothing is cancelled in flight.

use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::defaults::ListConfig;
use crate::error::Error;
use crate::Result;

pub mod debounce;
pub mod name_field;

pub use debounce::Debouncer;
pub use name_field::{FieldAction, NameField};

/// A record with a natural key, used to drop duplicates on append.
pub trait ListItem {
    fn key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    Browse,
    Search,
}

/// Mode-specific state. Browse fields have no meaning while searching.
#[derive(Debug, Clone, PartialEq)]
enum ModeState {
    Browse {
        page: usize,
        has_more: bool,
        total_count: Option<u64>,
    },
    Search {
        term: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FetchKind {
    /// One browse page. `replace` swaps the list instead of appending;
    /// `with_count` asks the store for the total row count as well.
    #[serde(rename_all = "camelCase")]
    Page {
        page: usize,
        page_size: usize,
        replace: bool,
        with_count: bool,
    },
    Search { term: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub version: u64,
    #[serde(flatten)]
    pub kind: FetchKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
}

impl<T> FetchResponse<T> {
    pub fn new(items: Vec<T>, total_count: Option<u64>) -> Self {
        Self { items, total_count }
    }
}

/// What a completed fetch did to the list.
#[derive(Debug, Clone)]
pub enum Completion {
    Replaced { count: usize },
    Appended { fetched: usize, added: usize },
    /// A newer request was issued after this one; the response was ignored.
    Stale,
    /// The fetch failed; items and paging are as they were before it.
    Failed(Error),
}

impl Completion {
    pub fn is_stale(&self) -> bool {
        matches!(self, Completion::Stale)
    }
}

/// Where the viewport sits relative to the end of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSnapshot {
    pub last_scroll_at: Option<Instant>,
    pub distance_to_bottom_px: f64,
}

impl ScrollSnapshot {
    pub fn from_viewport(
        scroll_top_px: f64,
        viewport_height_px: f64,
        document_height_px: f64,
        last_scroll_at: Option<Instant>,
    ) -> Self {
        Self {
            last_scroll_at,
            distance_to_bottom_px: (document_height_px - (scroll_top_px + viewport_height_px))
                .max(0.0),
        }
    }
}

/// Observable list state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot<'a, T> {
    pub items: &'a [T],
    pub mode: ListMode,
    pub is_loading: bool,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<&'a str>,
    pub version: u64,
}

#[derive(Debug, Clone)]
pub struct ListController<T> {
    items: Vec<T>,
    mode: ModeState,
    is_loading: bool,
    version: u64,
    just_appended: bool,
    config: ListConfig,
}

impl<T: ListItem> ListController<T> {
    pub fn new(config: ListConfig) -> Self {
        Self {
            items: Vec::new(),
            mode: ModeState::Browse {
                page: 1,
                has_more: true,
                total_count: None,
            },
            is_loading: false,
            version: 0,
            just_appended: false,
            config,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn mode(&self) -> ListMode {
        match self.mode {
            ModeState::Browse { .. } => ListMode::Browse,
            ModeState::Search { .. } => ListMode::Search,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Pagination is disabled while searching.
    pub fn has_more(&self) -> bool {
        match self.mode {
            ModeState::Browse { has_more, .. } => has_more,
            ModeState::Search { .. } => false,
        }
    }

    pub fn page(&self) -> Option<usize> {
        match self.mode {
            ModeState::Browse { page, .. } => Some(page),
            ModeState::Search { .. } => None,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> ListSnapshot<'_, T> {
        let (page, total_count, search_term) = match &self.mode {
            ModeState::Browse {
                page, total_count, ..
            } => (Some(*page), *total_count, None),
            ModeState::Search { term } => (None, None, Some(term.as_str())),
        };

        ListSnapshot {
            items: &self.items,
            mode: self.mode(),
            is_loading: self.is_loading,
            has_more: self.has_more(),
            page,
            total_count,
            search_term,
            version: self.version,
        }
    }

    fn issue(&mut self, kind: FetchKind) -> FetchRequest {
        self.version += 1;
        self.is_loading = true;
        self.just_appended = false;
        FetchRequest {
            version: self.version,
            kind,
        }
    }

    /// Initial load on mount: first page plus total count.
    pub fn start(&mut self) -> FetchRequest {
        self.mode = ModeState::Browse {
            page: 1,
            has_more: true,
            total_count: None,
        };
        self.first_page_request()
    }

    fn first_page_request(&mut self) -> FetchRequest {
        let page_size = self.config.page_size;
        self.issue(FetchKind::Page {
            page: 1,
            page_size,
            replace: true,
            with_count: true,
        })
    }

    /// Scroll reached the bottom (or the sentinel became visible).
    pub fn on_scroll_near_bottom(&mut self) -> Option<FetchRequest> {
        let next_page = match self.mode {
            ModeState::Browse {
                page,
                has_more: true,
                ..
            } if !self.is_loading => page + 1,
            _ => return None,
        };

        let page_size = self.config.page_size;
        Some(self.issue(FetchKind::Page {
            page: next_page,
            page_size,
            replace: false,
            with_count: false,
        }))
    }

    /// A validated query term arrived. An empty term clears the search.
    pub fn on_search_term_change(&mut self, term: &str) -> Option<FetchRequest> {
        let term = term.trim();
        if term.is_empty() {
            return self.on_search_cleared();
        }

        self.mode = ModeState::Search {
            term: term.to_string(),
        };
        Some(self.issue(FetchKind::Search {
            term: term.to_string(),
        }))
    }

    /// Leave search mode and reload the canonical first page and count.
    pub fn on_search_cleared(&mut self) -> Option<FetchRequest> {
        if matches!(self.mode, ModeState::Browse { .. }) {
            return None;
        }

        self.mode = ModeState::Browse {
            page: 1,
            has_more: true,
            total_count: None,
        };
        Some(self.first_page_request())
    }

    /// Apply the outcome of `request`, unless a newer request superseded it.
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<FetchResponse<T>>,
    ) -> Completion {
        if request.version != self.version {
            log_status!(
                "list",
                "Discarding stale response v{} (current v{})",
                request.version,
                self.version
            );
            return Completion::Stale;
        }

        self.is_loading = false;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                log_status!("list", "Fetch v{} failed: {}", request.version, err);
                return Completion::Failed(err);
            }
        };

        match (&request.kind, &mut self.mode) {
            (
                FetchKind::Page {
                    page,
                    page_size,
                    replace: true,
                    ..
                },
                ModeState::Browse {
                    page: current_page,
                    has_more,
                    total_count,
                },
            ) => {
                let fetched = response.items.len();
                if response.total_count.is_some() {
                    *total_count = response.total_count;
                }
                *has_more = match *total_count {
                    Some(total) => (fetched as u64) < total,
                    None => fetched == *page_size,
                };
                *current_page = *page;
                self.items = dedup_by_key(response.items);
                Completion::Replaced {
                    count: self.items.len(),
                }
            }
            (
                FetchKind::Page {
                    page,
                    page_size,
                    replace: false,
                    ..
                },
                ModeState::Browse {
                    page: current_page,
                    has_more,
                    total_count,
                },
            ) => {
                let fetched = response.items.len();
                let added = append_new(&mut self.items, response.items);
                let exhausted =
                    total_count.is_some_and(|total| self.items.len() as u64 >= total);
                *has_more = fetched >= *page_size && !exhausted;
                *current_page = *page;
                self.just_appended = true;
                Completion::Appended { fetched, added }
            }
            (FetchKind::Search { term }, ModeState::Search { term: current }) if *term == *current => {
                self.items = dedup_by_key(response.items);
                Completion::Replaced {
                    count: self.items.len(),
                }
            }
            _ => {
                log_status!(
                    "list",
                    "Dropping response v{} that no longer matches the list mode",
                    request.version
                );
                Completion::Stale
            }
        }
    }

    /// Run `request` through `fetch` and apply the result immediately.
    pub fn drive<F>(&mut self, request: &FetchRequest, fetch: F) -> Completion
    where
        F: FnOnce(&FetchRequest) -> Result<FetchResponse<T>>,
    {
        let result = fetch(request);
        self.complete(request, result)
    }

    /// After an append lands, keep loading if the user is still parked near the
    /// bottom. Appending below the fold does not move the scroll position, so
    /// no fresh scroll event would fire on its own.
    ///
    /// Returns the request to run on the next frame.
    pub fn auto_continue(&mut self, scroll: ScrollSnapshot, now: Instant) -> Option<FetchRequest> {
        if !self.just_appended {
            return None;
        }

        let window = Duration::from_millis(self.config.auto_continue_window_ms);
        let scrolled_recently = scroll
            .last_scroll_at
            .is_some_and(|at| now.saturating_duration_since(at) <= window);
        let near_bottom = scroll.distance_to_bottom_px <= self.config.near_bottom_threshold_px;

        if scrolled_recently && near_bottom {
            self.on_scroll_near_bottom()
        } else {
            None
        }
    }
}

/// Append items whose key is not already present. Returns how many were added.
fn append_new<T: ListItem>(items: &mut Vec<T>, incoming: Vec<T>) -> usize {
    let mut seen: HashSet<String> = items.iter().map(|i| i.key().to_string()).collect();
    let before = items.len();
    for item in incoming {
        if seen.insert(item.key().to_string()) {
            items.push(item);
        }
    }
    items.len() - before
}

fn dedup_by_key<T: ListItem>(incoming: Vec<T>) -> Vec<T> {
    let mut items = Vec::with_capacity(incoming.len());
    append_new(&mut items, incoming);
    items
}
