pub mod command;
pub mod search;
pub mod shortcut;

pub use command::{CommandAction, CommandCategory, CommandCategoryMap, CommandItem, apply_command};
pub use search::CommandPalette;
pub use shortcut::{KeyEventKind, KeyPress, KeyShortcut, ShortcutTrigger};
