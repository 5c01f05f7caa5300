use crate::command::{CommandCategory, CommandCategoryMap, CommandItem, apply_command};
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32String};
use topoview_events::{Event, EventBus};

/// Registered commands, searchable by description.
pub struct CommandPalette {
    matcher: Matcher,
    commands: Vec<(Utf32String, CommandItem)>,
    categories: CommandCategoryMap,
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandPalette {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            commands: Vec::new(),
            categories: CommandCategoryMap::new(),
        }
    }

    pub fn register(&mut self, command: CommandItem) {
        self.commands
            .push((Utf32String::from(command.description.as_str()), command));
    }

    pub fn add_category(&mut self, id: u32, category: CommandCategory) {
        self.categories.insert(id, category);
    }

    pub fn category_of(&self, command: &CommandItem) -> Option<&CommandCategory> {
        command.category.and_then(|id| self.categories.get(&id))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands whose description fuzzy-matches `query`, best match first.
    /// Equal scores keep registration order; an empty query lists every
    /// command in registration order.
    pub fn search(&mut self, query: &str) -> Vec<&CommandItem> {
        if query.trim().is_empty() {
            return self.commands.iter().map(|(_, command)| command).collect();
        }

        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let mut matches = Vec::new();
        for (name, command) in &self.commands {
            if let Some(score) = pattern.score(name.slice(..), &mut self.matcher) {
                matches.push((command, score));
            }
        }

        // `sort_by` is stable.
        matches.sort_by(|a, b| b.1.cmp(&a.1));
        matches.into_iter().map(|(command, _)| command).collect()
    }

    /// Applies `command` and announces it on `bus` if it ran.
    pub fn apply(&self, command: &CommandItem, bus: &EventBus) -> bool {
        let applied = apply_command(command);
        if applied {
            bus.publish(Event::CommandApplied {
                description: command.description.clone(),
            });
        }
        applied
    }
}
