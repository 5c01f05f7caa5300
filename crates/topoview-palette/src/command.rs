use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCategory {
    pub name: String,
    /// CSS-style color the palette tags the category with.
    pub color: String,
}

pub type CommandCategoryMap = HashMap<u32, CommandCategory>;

#[derive(Clone)]
pub enum CommandAction {
    Callback(Arc<dyn Fn() + Send + Sync>),
    /// Numeric action id from older palettes. Applying it does nothing.
    Legacy(u32),
}

impl fmt::Debug for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Legacy(id) => f.debug_tuple("Legacy").field(id).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandItem {
    pub description: String,
    pub category: Option<u32>,
    pub action: CommandAction,
}

impl CommandItem {
    pub fn new(description: impl Into<String>, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            description: description.into(),
            category: None,
            action: CommandAction::Callback(Arc::new(action)),
        }
    }

    pub fn legacy(description: impl Into<String>, action: u32) -> Self {
        Self {
            description: description.into(),
            category: None,
            action: CommandAction::Legacy(action),
        }
    }

    pub fn in_category(mut self, category: u32) -> Self {
        self.category = Some(category);
        self
    }
}

/// Runs the command's callback. Returns false for legacy numeric actions,
/// which are skipped.
pub fn apply_command(command: &CommandItem) -> bool {
    match &command.action {
        CommandAction::Callback(callback) => {
            callback();
            true
        }
        CommandAction::Legacy(id) => {
            tracing::debug!("Skipping legacy action {} of {:?}", id, command.description);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_apply_runs_callback() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let command = CommandItem::new("Unhide all", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(apply_command(&command));
        assert!(apply_command(&command));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_legacy_action_is_ignored() {
        let command = CommandItem::legacy("Old command", 7).in_category(2);
        assert!(!apply_command(&command));
        assert_eq!(command.category, Some(2));
        assert_eq!(format!("{:?}", command.action), "Legacy(7)");
    }
}
