pub mod document;
pub mod fan;
pub mod graph;
pub mod grouping;
pub mod pinned;
pub mod sample;
pub mod session;
pub mod unhidden;
pub mod user_state;
pub mod view;

pub use document::{DocumentError, GraphDocument, GroupSpec, LinkSpec, NodeSpec, UserStateDocument};
pub use fan::{
    DirectedLink, FanPins, PinCombination, PinnedLinks, SimLink, fan_in_fan_out_links, pinned_links,
};
pub use graph::{LinkIndex, NetworkGraph, NodeIndex};
pub use grouping::{compute_grouped_graph, highest_collapsed_ancestors};
pub use pinned::compute_pinned_graph;
pub use sample::sample_graph;
pub use session::GraphSession;
pub use unhidden::{UnhiddenGraph, compute_unhidden_graph};
pub use user_state::{
    GraphUserState, LinkUserStateMap, NodeUserStateMap, UserStateMap, resolve_link_state,
    resolve_node_state,
};
pub use view::{ViewGraph, compute_view_graph, resolve_link_states};
