pub mod affiliate;
pub mod bulk;
pub mod config;
pub mod logging;
pub mod tui;
