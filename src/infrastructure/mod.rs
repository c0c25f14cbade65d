pub mod error_logging;
pub mod filesystem;
pub mod logging;

pub use error_logging::{ErrorLogger, ErrorType};
pub use filesystem::{join_path, FileSystem, FsEntry, InMemoryFs, RealFs};
pub use logging::{Logger, LoggerTrait};
