pub mod console;
pub mod display;

pub use console::ConsoleFrontend;
pub use display::{format_duration, format_file_size, print_banner, SearchSummary};
