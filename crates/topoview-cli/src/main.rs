mod render;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use settings::{Settings, SettingsSource};
use std::path::PathBuf;
use topoview_core::NodeId;
use topoview_events::{Event, EventBus};
use topoview_graph::{GraphDocument, GraphSession, GraphUserState, UserStateDocument, sample_graph};
use topoview_palette::{CommandItem, CommandPalette};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Summary,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Derive the visible view of a hierarchical network graph", long_about = None)]
struct Args {
    /// Graph document. The built-in sample graph is used when absent.
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// User-state document with pinned/expanded/hidden overrides
    #[arg(short, long)]
    state: Option<PathBuf>,

    #[arg(long = "pin", value_name = "ID")]
    pin: Vec<String>,

    #[arg(long = "hide", value_name = "ID")]
    hide: Vec<String>,

    #[arg(long = "collapse", value_name = "ID")]
    collapse: Vec<String>,

    #[arg(long = "expand", value_name = "ID")]
    expand: Vec<String>,

    /// Bulk command picked by fuzzy match, e.g. "unhide" or "collapse all"
    #[arg(short = 'x', long = "command", value_name = "QUERY")]
    command: Vec<String>,

    #[arg(short, long, value_enum, default_value = "summary")]
    format: Format,

    /// Print one page of the summary, sized by `list.page_size`
    #[arg(long)]
    page: Option<usize>,

    /// Write the resulting user state to this file
    #[arg(long, value_name = "PATH")]
    save_state: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (settings, source) = Settings::load(args.config.as_deref());

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        settings.level()
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &source {
        SettingsSource::File(path) => info!("Loaded settings from {:?}", path),
        SettingsSource::NotFound(path) => debug!("Settings file {:?} not found, using defaults", path),
        SettingsSource::NoConfigDir => debug!("No config directory, using default settings"),
        SettingsSource::Invalid { path, reason } => {
            warn!("Ignoring settings {:?}: {}", path, reason)
        }
    }

    let mut graph = match &args.graph {
        Some(path) => GraphDocument::load(path)?
            .into_graph()
            .with_context(|| format!("Failed to build graph from {}", path.display()))?,
        None => {
            info!("No graph document given, using the sample graph");
            sample_graph()
        }
    };
    if settings.sort_children_by_id {
        graph.sort_nodes(|a, b| a.id.cmp(&b.id));
    }

    let user_state = match &args.state {
        Some(path) => UserStateDocument::load(path)?.into_user_state(),
        None => GraphUserState::new(),
    };
    let mut session = GraphSession::with_user_state(graph, user_state);

    let bus = EventBus::new();
    publish_gestures(&bus, &args);
    run_commands(&bus, &args.command);
    let handled = bus.dispatch_to(&mut session);
    debug!("Dispatched {} events", handled);

    if let Some(path) = &args.save_state {
        let document = UserStateDocument::from_user_state(session.user_state());
        std::fs::write(path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved user state to {:?}", path);
    }

    let view = session.view();
    match args.format {
        Format::Json => println!("{}", render::view_json(view, settings.pretty)?),
        Format::Summary => {
            let lines = render::summary_lines(view);
            let lines = match args.page {
                Some(page) => render::summary_page(lines, page, &settings.list)?,
                None => lines,
            };
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn publish_gestures(bus: &EventBus, args: &Args) {
    for id in &args.hide {
        bus.publish(Event::SetNodeIsHidden {
            id: NodeId::new(id.as_str()),
            is_hidden: true,
        });
    }
    for (ids, is_expanded) in [(&args.collapse, false), (&args.expand, true)] {
        for id in ids {
            bus.publish(Event::SetNodeIsExpanded {
                id: NodeId::new(id.as_str()),
                is_expanded,
            });
        }
    }
    for id in &args.pin {
        bus.publish(Event::SetNodeIsPinned {
            id: NodeId::new(id.as_str()),
            is_pinned: true,
        });
    }
}

fn bulk_commands(bus: &EventBus) -> CommandPalette {
    let mut palette = CommandPalette::new();
    let commands = [
        ("Unhide all nodes", Event::UnhideAll),
        ("Unpin all nodes", Event::UnpinAll),
        ("Hide pinned nodes", Event::HidePinned),
        ("Expand all nodes", Event::ExpandAll),
        ("Collapse all nodes", Event::CollapseAll),
    ];
    for (description, event) in commands {
        let sender = bus.sender();
        palette.register(CommandItem::new(description, move || {
            let _ = sender.send(event.clone());
        }));
    }
    palette
}

fn run_commands(bus: &EventBus, queries: &[String]) {
    if queries.is_empty() {
        return;
    }
    let mut palette = bulk_commands(bus);
    for query in queries {
        let Some(command) = palette.search(query).first().map(|command| (*command).clone()) else {
            warn!("No command matches {:?}", query);
            continue;
        };
        info!("Running command {:?} for {:?}", command.description, query);
        palette.apply(&command, bus);
    }
}
