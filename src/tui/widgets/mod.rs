//! TUI widgets for querydesk.

pub mod analysis;
pub mod editor;
pub mod header;
pub mod result;
pub mod sidebar;
pub mod spinner;
pub mod suggestions;
pub mod table;
pub mod template_bar;
pub mod toast;
