mod config;
mod detect;
mod library;
mod resolve;
mod scan;

pub use config::{init_config, show_config, InitConfigArgs};
pub use detect::{detect_game, DetectArgs};
pub use library::{show_library, LibraryArgs};
pub use resolve::{resolve_name, ResolveArgs};
pub use scan::{scan_processes, ScanArgs};
