// 四层架构模块
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

// 重新导出主要类型
pub use domain::{
    ClassificationRules, InputError, MatchRecord, RelocationMode, RelocationReport, Relocator,
    SearchRequest, TextMatcher, Walker,
};
pub use application::{Config, Controller, ControllerError, Frontend, RelocationChoice, RunSummary};
pub use infrastructure::{ErrorLogger, ErrorType, FileSystem, InMemoryFs, Logger, LoggerTrait, RealFs};
pub use presentation::{ConsoleFrontend, SearchSummary};
