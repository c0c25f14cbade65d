pub mod classifier;
pub mod file_walker;
pub mod matcher;
pub mod relocator;
pub mod search;

pub use classifier::ClassificationRules;
pub use file_walker::{WalkEvent, WalkOutcome, Walker};
pub use matcher::TextMatcher;
pub use relocator::{
    unique_destination, RelocationEntry, RelocationMode, RelocationOutcome, RelocationReport,
    Relocator,
};
pub use search::{InputError, MatchRecord, SearchRequest};
