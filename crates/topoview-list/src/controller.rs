use crate::cancellation::CancellationToken;
use crate::error::ListError;
use crate::fetch::{FetchEvent, ListFetcher, ListStream, StreamPoll};
use crate::filter::ListFilter;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Per-item UI state the controller needs to track selection.
pub trait UiSelectionState {
    fn is_selected(&self) -> bool;
    fn set_selected(&mut self, selected: bool);
}

/// Default per-item UI state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub index: usize,
    pub selected: bool,
    pub visible: bool,
    pub nesting_level: usize,
    pub nested_visible: bool,
}

impl SelectionState {
    pub fn factory<T>(index: usize, _data: &T) -> Self {
        Self {
            index,
            visible: true,
            ..Self::default()
        }
    }
}

impl UiSelectionState for SelectionState {
    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<T, U> {
    pub data: T,
    pub ui_state: U,
}

/// How streamed items are matched against the items already shown.
pub enum ItemIdentity<T> {
    /// The new page replaces the old one once it completes.
    Positional,
    /// Items with a known key are replaced in place as they arrive; items
    /// the new page did not mention are dropped when it completes.
    UniqueId(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T> ItemIdentity<T> {
    pub fn unique_id(key: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self::UniqueId(Arc::new(key))
    }
}

impl<T> Clone for ItemIdentity<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Positional => Self::Positional,
            Self::UniqueId(key) => Self::UniqueId(Arc::clone(key)),
        }
    }
}

impl<T> fmt::Debug for ItemIdentity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional => f.write_str("Positional"),
            Self::UniqueId(_) => f.write_str("UniqueId(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListControllerOptions<T> {
    /// `refresh()` on a full page moves on to the next known page, and comes
    /// back if that page turns out empty.
    pub auto_advance: bool,
    pub identity: ItemIdentity<T>,
}

impl<T> Default for ListControllerOptions<T> {
    fn default() -> Self {
        Self {
            auto_advance: false,
            identity: ItemIdentity::Positional,
        }
    }
}

type UiStateFactory<T, U> = Box<dyn Fn(usize, &T) -> U>;

struct InFlight<T, U, Tok> {
    stream: ListStream<T, Tok>,
    cancel: CancellationToken,
    generation: u64,
    received: usize,
    /// Positional mode collects the page here until it completes.
    staged: Vec<ListItem<T, U>>,
    /// Unique-id mode records which keys the page mentioned.
    seen: HashSet<String>,
    /// Page to return to if an auto-advanced fetch comes back empty.
    rollback_page: Option<usize>,
}

/// Drives a server-paginated list: page tokens, the current page's items,
/// and their selection.
///
/// Pages are 1-based. The token for page `n` is learned when page `n - 1`
/// completes, so `max_page` grows one page at a time. At most one fetch is in
/// flight; starting another cancels it and its events are never read.
pub struct ListController<V, T, Tok, U = SelectionState> {
    filter: ListFilter<V>,
    fetcher: Box<dyn ListFetcher<V, T, Tok>>,
    ui_state_factory: UiStateFactory<T, U>,
    options: ListControllerOptions<T>,

    items: Vec<ListItem<T, U>>,
    page: usize,
    next_page_tokens: Vec<Option<Tok>>,
    in_flight: Option<InFlight<T, U, Tok>>,
    generation: u64,
    destroyed: bool,

    is_loading: bool,
    error: Option<String>,
    selection_count: usize,
    is_all_selected: Option<bool>,

    loading_callback: Option<Box<dyn FnMut(bool)>>,
    all_selected_callback: Option<Box<dyn FnMut(Option<bool>)>>,
}

impl<V, T: 'static, Tok: Clone> ListController<V, T, Tok, SelectionState> {
    pub fn with_selection_state(
        filter: ListFilter<V>,
        fetcher: impl ListFetcher<V, T, Tok> + 'static,
    ) -> Self {
        Self::new(filter, fetcher, SelectionState::factory::<T>)
    }
}

impl<V, T, Tok, U> ListController<V, T, Tok, U>
where
    Tok: Clone,
    U: UiSelectionState,
{
    /// Creates a controller on page 1. Nothing is fetched until the first
    /// `refresh()`.
    pub fn new(
        filter: ListFilter<V>,
        fetcher: impl ListFetcher<V, T, Tok> + 'static,
        ui_state_factory: impl Fn(usize, &T) -> U + 'static,
    ) -> Self {
        Self {
            filter,
            fetcher: Box::new(fetcher),
            ui_state_factory: Box::new(ui_state_factory),
            options: ListControllerOptions::default(),
            items: Vec::new(),
            page: 1,
            next_page_tokens: vec![None, None],
            in_flight: None,
            generation: 0,
            destroyed: false,
            is_loading: false,
            error: None,
            selection_count: 0,
            is_all_selected: Some(false),
            loading_callback: None,
            all_selected_callback: None,
        }
    }

    pub fn with_options(mut self, options: ListControllerOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn on_loading_changed(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.loading_callback = Some(Box::new(callback));
        self
    }

    pub fn on_all_selected_changed(mut self, callback: impl FnMut(Option<bool>) + 'static) -> Self {
        self.all_selected_callback = Some(Box::new(callback));
        self
    }

    pub fn filter(&self) -> &ListFilter<V> {
        &self.filter
    }

    pub fn page_size(&self) -> usize {
        self.filter.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Highest page whose token is known.
    pub fn max_page(&self) -> usize {
        self.next_page_tokens.len() - 1
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed fetch, cleared when the next one starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn items(&self) -> &[ListItem<T, U>] {
        &self.items
    }

    pub fn selected_items(&self) -> impl Iterator<Item = &ListItem<T, U>> {
        self.items.iter().filter(|item| item.ui_state.is_selected())
    }

    pub fn selection_count(&self) -> usize {
        self.selection_count
    }

    /// `Some(true)` if every item is selected, `Some(false)` if none is, and
    /// `None` for a partial selection.
    pub fn is_all_selected(&self) -> Option<bool> {
        self.is_all_selected
    }

    pub fn filter_changed(&mut self, filter: ListFilter<V>) {
        self.filter = filter;
        self.reset_to_first_page();
        self.fetch_list(None);
    }

    pub fn page_size_changed(&mut self, page_size: usize) {
        self.filter.page_size = page_size;
        self.reset_to_first_page();
        self.fetch_list(None);
    }

    pub fn page_changed(&mut self, page: usize) -> Result<(), ListError> {
        let max_page = self.max_page();
        if page < 1 || page > max_page {
            error!("List page {} out of bounds (max page {})", page, max_page);
            return Err(ListError::PageOutOfBounds { page, max_page });
        }
        self.page = page;
        self.fetch_list(None);
        Ok(())
    }

    /// Refetches the current page, or the next one when auto-advance is on
    /// and the current page is full.
    pub fn refresh(&mut self) {
        let is_full = !self.items.is_empty() && self.items.len() >= self.filter.page_size;
        if self.options.auto_advance && is_full && self.page < self.max_page() {
            let previous = self.page;
            self.page += 1;
            debug!("Auto-advancing list from page {} to {}", previous, self.page);
            self.fetch_list(Some(previous));
        } else {
            self.fetch_list(None);
        }
    }

    /// Applies whatever the in-flight fetch has delivered so far. Returns
    /// `Ok(true)` once there is nothing left in flight, or the fetch's error
    /// if it failed (also kept in [`ListController::error`]).
    pub fn poll(&mut self) -> Result<bool, ListError> {
        while let Some(in_flight) = &self.in_flight {
            match in_flight.stream.try_next() {
                StreamPoll::Event(event) => self.apply(event)?,
                StreamPoll::Empty => return Ok(false),
                StreamPoll::Closed => self.apply(FetchEvent::Complete { next_page_token: None })?,
            }
        }
        Ok(true)
    }

    /// Blocks until the in-flight fetch completes or fails.
    pub fn wait(&mut self) -> Result<(), ListError> {
        while let Some(in_flight) = &self.in_flight {
            match in_flight.stream.next_blocking() {
                StreamPoll::Event(event) => self.apply(event)?,
                StreamPoll::Empty | StreamPoll::Closed => {
                    self.apply(FetchEvent::Complete { next_page_token: None })?
                }
            }
        }
        Ok(())
    }

    /// Flips the selection of the item at `index`. Returns its new state.
    pub fn toggle_selected(&mut self, index: usize) -> Option<bool> {
        let item = self.items.get_mut(index)?;
        let selected = !item.ui_state.is_selected();
        item.ui_state.set_selected(selected);
        // Unique-id pages insert items mid-stream, so count from the items.
        self.recount_selection();
        Some(selected)
    }

    pub fn toggle_all_selected(&mut self) {
        let selected = self.is_all_selected != Some(true);
        for item in &mut self.items {
            item.ui_state.set_selected(selected);
        }
        self.selection_count = if selected { self.items.len() } else { 0 };
        self.set_is_all_selected(Some(selected));
    }

    /// Stops the in-flight fetch. Later calls fetch nothing.
    pub fn destroy(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
        self.destroyed = true;
        self.set_is_loading(false);
    }

    fn reset_to_first_page(&mut self) {
        self.page = 1;
        // Index 0 is unused so tokens line up with 1-based pages; page 1
        // needs no token.
        self.next_page_tokens = vec![None, None];
    }

    fn fetch_list(&mut self, rollback_page: Option<usize>) {
        if self.destroyed {
            warn!("Ignoring fetch on a destroyed list controller");
            return;
        }
        if let Some(previous) = self.in_flight.take() {
            debug!("Cancelling list fetch {}", previous.generation);
            previous.cancel.cancel();
        }

        self.generation += 1;
        self.error = None;
        self.set_is_loading(true);

        let cancel = CancellationToken::new();
        let token = self.next_page_tokens.get(self.page).cloned().flatten();
        let stream = self
            .fetcher
            .fetch(&self.filter, token.as_ref(), cancel.clone());
        self.in_flight = Some(InFlight {
            stream,
            cancel,
            generation: self.generation,
            received: 0,
            staged: Vec::new(),
            seen: HashSet::new(),
            rollback_page,
        });
    }

    fn apply(&mut self, event: FetchEvent<T, Tok>) -> Result<(), ListError> {
        match event {
            FetchEvent::Item(data) => self.receive(data),
            FetchEvent::Complete { next_page_token } => self.complete(next_page_token),
            FetchEvent::Failed(message) => return Err(self.fail(message)),
        }
        Ok(())
    }

    fn receive(&mut self, data: T) {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return;
        };
        let index = in_flight.received;
        in_flight.received += 1;

        match &self.options.identity {
            ItemIdentity::Positional => {
                let ui_state = (self.ui_state_factory)(index, &data);
                in_flight.staged.push(ListItem { data, ui_state });
            }
            ItemIdentity::UniqueId(key) => {
                let id = key(&data);
                match self.items.iter_mut().find(|item| key(&item.data) == id) {
                    Some(existing) => existing.data = data,
                    None => {
                        let ui_state = (self.ui_state_factory)(index, &data);
                        self.items.push(ListItem { data, ui_state });
                    }
                }
                in_flight.seen.insert(id);
            }
        }
    }

    fn complete(&mut self, next_page_token: Option<Tok>) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        self.set_is_loading(false);

        if in_flight.received == 0 {
            if let Some(previous) = in_flight.rollback_page {
                debug!("Page {} is empty, returning to page {}", self.page, previous);
                // The empty page was the frontier; forget its token.
                if self.page == self.max_page() && self.page > previous {
                    self.next_page_tokens.pop();
                }
                self.page = previous;
                return;
            }
        }

        match &self.options.identity {
            ItemIdentity::Positional => {
                self.items = in_flight.staged;
            }
            ItemIdentity::UniqueId(key) => {
                self.items.retain(|item| in_flight.seen.contains(&key(&item.data)));
            }
        }
        self.recount_selection();

        // A short page is the last one, whatever the server says.
        let next_page_token = if in_flight.received < self.filter.page_size {
            None
        } else {
            next_page_token
        };
        self.update_next_page_token(next_page_token);
    }

    fn fail(&mut self, message: String) -> ListError {
        if let Some(in_flight) = self.in_flight.take() {
            warn!("List fetch {} failed: {}", in_flight.generation, message);
        }
        // Items from before the fetch stay; staged items are dropped.
        self.error = Some(message.clone());
        self.set_is_loading(false);
        self.recount_selection();
        ListError::Fetch(message)
    }

    fn update_next_page_token(&mut self, next_page_token: Option<Tok>) {
        let max_page = self.max_page();
        if self.page < 1 || self.page > max_page {
            error!("List page {} out of bounds (max page {})", self.page, max_page);
        } else if self.page == max_page {
            if let Some(token) = next_page_token {
                self.next_page_tokens.push(Some(token));
            }
        }
        // Interior pages keep the token they already have. Tokens cannot be
        // compared in general, so the backend list is assumed stable.
    }

    fn recount_selection(&mut self) {
        self.selection_count = self
            .items
            .iter()
            .filter(|item| item.ui_state.is_selected())
            .count();
        self.update_is_all_selected();
    }

    fn update_is_all_selected(&mut self) {
        let all_selected = if self.selection_count == 0 {
            Some(false)
        } else if self.selection_count == self.items.len() {
            Some(true)
        } else {
            None
        };
        self.set_is_all_selected(all_selected);
    }

    fn set_is_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        if let Some(callback) = self.loading_callback.as_mut() {
            callback(loading);
        }
    }

    fn set_is_all_selected(&mut self, all_selected: Option<bool>) {
        self.is_all_selected = all_selected;
        if let Some(callback) = self.all_selected_callback.as_mut() {
            callback(all_selected);
        }
    }
}
