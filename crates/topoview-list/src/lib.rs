pub mod cancellation;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod grouping;

pub use cancellation::CancellationToken;
pub use controller::{
    ItemIdentity, ListController, ListControllerOptions, ListItem, SelectionState,
    UiSelectionState,
};
pub use error::ListError;
pub use fetch::{FetchEvent, ListFetcher, ListSink, ListStream};
pub use filter::{ListFilter, TimeRange};
pub use grouping::ListGroupingController;
