//! Collection of reusable TUI components.

pub mod command_palette;
pub mod fragment_list;
pub mod summary;
