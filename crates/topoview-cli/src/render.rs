use crate::settings::ListSettings;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use topoview_core::{LINK_TYPE_GROUPED, Node, NodeUserStateCounts};
use topoview_graph::{GraphDocument, NetworkGraph, ViewGraph};
use topoview_list::{
    CancellationToken, ItemIdentity, ListController, ListControllerOptions, ListFilter, ListStream,
};

#[derive(Serialize)]
struct ViewOutput {
    counts: NodeUserStateCounts,
    #[serde(flatten)]
    graph: GraphDocument,
}

pub fn view_json(view: &ViewGraph, pretty: bool) -> Result<String> {
    let output = ViewOutput {
        counts: view.counts,
        graph: GraphDocument::from_graph(&view.graph),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(json)
}

/// One line per node, indented by depth, followed by one line per link.
pub fn summary_lines(view: &ViewGraph) -> Vec<String> {
    let graph = &view.graph;
    let mut lines = Vec::with_capacity(graph.node_count() + graph.link_count());
    for column in graph.columns() {
        push_node(graph, column, 0, &mut lines);
    }
    for link in graph.links() {
        let arrow = if link.link_type == LINK_TYPE_GROUPED { "==>" } else { "-->" };
        let selected = if link.state.is_selected { " *" } else { "" };
        lines.push(format!("{} {} {}{}", link.source, arrow, link.target, selected));
    }
    lines
}

fn push_node(graph: &NetworkGraph, node: &Node, depth: usize, lines: &mut Vec<String>) {
    let mut line = format!("{}{}", "  ".repeat(depth), node.id);
    if node.state.is_pinned {
        line.push_str(" [pinned]");
    }
    let collapsed = node.has_children() && !node.state.is_expanded;
    if collapsed {
        line.push_str(" [collapsed]");
    }
    lines.push(line);
    if collapsed {
        return;
    }
    for child in graph.children(&node.id) {
        push_node(graph, child, depth + 1, lines);
    }
}

/// Cuts `lines` into pages of `settings.page_size` and returns page `page`
/// (1-based), walking the page tokens up to it.
pub fn summary_page(lines: Vec<String>, page: usize, settings: &ListSettings) -> Result<Vec<String>> {
    if page == 0 {
        bail!("Pages are numbered from 1");
    }
    let total = lines.len();
    let fetcher = move |filter: &ListFilter<()>, token: Option<&usize>, _cancel: CancellationToken| {
        let start = token.copied().unwrap_or(0).min(total);
        let end = (start + filter.page_size).min(total);
        ListStream::ready(lines[start..end].to_vec(), (end < total).then_some(end))
    };
    let mut list = ListController::with_selection_state(ListFilter::new(settings.page_size.max(1), ()), fetcher)
        .with_options(ListControllerOptions {
            auto_advance: settings.auto_advance,
            identity: ItemIdentity::Positional,
        });

    list.refresh();
    list.wait().context("Failed to page summary")?;
    while list.page() < page {
        list.page_changed(list.page() + 1)?;
        list.wait().context("Failed to page summary")?;
    }
    Ok(list.items().iter().map(|item| item.data.clone()).collect())
}
