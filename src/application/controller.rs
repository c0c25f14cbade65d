use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::application::Config;
use crate::domain::{
    InputError, MatchRecord, RelocationEntry, RelocationMode, RelocationOutcome, RelocationReport,
    Relocator, SearchRequest, TextMatcher, WalkEvent, Walker,
};
use crate::infrastructure::{ErrorLogger, ErrorType, FileSystem, LoggerTrait};

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Validating,
    Searching,
    NoMatches,
    HasMatches,
    AwaitingAction,
    Relocating,
    Done,
    /// 输入校验失败，提前结束
    InvalidInput,
}

/// 用户选择的后续操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationChoice {
    Copy,
    Move,
    ShowOnly,
}

/// 控制器向界面发出的通知
#[derive(Debug)]
pub enum ControllerEvent<'a> {
    SearchStarted { request: &'a SearchRequest },
    Progress { files_searched: u64 },
    Found(&'a Path),
    SearchFinished { files_searched: u64, files_found: u64, elapsed: Duration },
    NoMatches { search_text: &'a str },
    CreatingDestination(&'a Path),
    DestinationFailed { path: &'a Path, error: &'a io::Error },
    RelocationStarted { mode: RelocationMode, count: usize, dest_dir: &'a Path },
    Relocated(&'a RelocationEntry),
    RelocationFinished(&'a RelocationReport),
    MoveCancelled,
    /// 没有给出目标目录，按只显示结果处理
    NoDestination,
}

/// 与用户交互的界面
pub trait Frontend {
    fn notify(&mut self, _event: ControllerEvent<'_>) {}
    fn choose_action(&mut self, files_found: u64) -> io::Result<RelocationChoice>;
    /// 返回 None 表示没有给出目录（空行或输入结束）
    fn destination_dir(&mut self) -> io::Result<Option<PathBuf>>;
    /// 移动不可撤销，执行前必须得到确认
    fn confirm_move(&mut self) -> io::Result<bool>;
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("交互失败: {0}")]
    Interaction(#[from] io::Error),
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunSummary {
    pub files_searched: u64,
    pub files_found: u64,
    pub relocation: Option<RelocationReport>,
}

/// 编排搜索与搬移
pub struct Controller<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    config: &'a Config,
    logger: &'a dyn LoggerTrait,
    error_logger: &'a ErrorLogger,
    state: ControllerState,
    matches: Vec<MatchRecord>,
    files_searched: u64,
    files_found: u64,
    search_elapsed: Duration,
}

impl<'a, F: FileSystem + ?Sized> Controller<'a, F> {
    pub fn new(
        fs: &'a F,
        config: &'a Config,
        logger: &'a dyn LoggerTrait,
        error_logger: &'a ErrorLogger,
    ) -> Self {
        Self {
            fs,
            config,
            logger,
            error_logger,
            state: ControllerState::Idle,
            matches: Vec::new(),
            files_searched: 0,
            files_found: 0,
            search_elapsed: Duration::ZERO,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// 校验输入、搜索，并按用户选择复制或移动匹配文件
    pub fn run(
        &mut self,
        root_path: impl Into<PathBuf>,
        search_text: impl Into<String>,
        frontend: &mut dyn Frontend,
    ) -> Result<RunSummary, ControllerError> {
        self.state = ControllerState::Validating;
        let request = match SearchRequest::new(self.fs, root_path, search_text) {
            Ok(request) => request,
            Err(err) => {
                self.state = ControllerState::InvalidInput;
                let _ = self.logger.log_message(&format!("输入无效: {}", err));
                return Err(err.into());
            }
        };

        self.search(&request, frontend);

        let relocation = if self.matches.is_empty() {
            self.state = ControllerState::NoMatches;
            frontend.notify(ControllerEvent::NoMatches { search_text: request.search_text() });
            Ok(None)
        } else {
            self.state = ControllerState::HasMatches;
            self.offer_relocation(frontend)
        };

        // 汇总放在搬移记录之后，交互失败时也要写
        let _ = self
            .logger
            .finalize(self.files_searched, self.files_found, self.search_elapsed);
        let relocation = relocation?;

        self.state = ControllerState::Done;
        self.matches.clear();

        Ok(RunSummary {
            files_searched: self.files_searched,
            files_found: self.files_found,
            relocation,
        })
    }

    fn search(&mut self, request: &SearchRequest, frontend: &mut dyn Frontend) {
        self.state = ControllerState::Searching;
        frontend.notify(ControllerEvent::SearchStarted { request });

        let _ = self.logger.log_message(&format!("搜索文本: {}", request.search_text()));
        let _ = self
            .logger
            .log_message(&format!("目标目录: {}", request.root_path().display()));

        let rules = self.config.classification_rules();
        let matcher = TextMatcher::new(request.search_text(), self.config.search.line_buffer_size);
        let logger = self.logger;
        let error_logger = self.error_logger;

        let start_time = Instant::now();
        let outcome = Walker::new(self.fs, &rules, &matcher)
            .with_progress_interval(self.config.search.progress_interval)
            .search(request.root_path(), |event| match event {
                WalkEvent::Progress { files_searched } => {
                    frontend.notify(ControllerEvent::Progress { files_searched });
                }
                WalkEvent::Searched { path, matched } => {
                    let _ = logger.log_file(path, if matched { "匹配" } else { "不匹配" });
                }
                WalkEvent::Found(path) => {
                    frontend.notify(ControllerEvent::Found(path));
                }
                WalkEvent::SkippedDirectory { path, error } => {
                    let _ = error_logger.log_error(
                        ErrorType::DirectoryRead,
                        Some(path),
                        "无法列出目录，已跳过",
                        Some(&error.to_string()),
                    );
                }
                WalkEvent::UnreadableFile { path, error } => {
                    let _ = error_logger.log_error(
                        ErrorType::FileRead,
                        Some(path),
                        "无法打开文件，按不匹配处理",
                        Some(&error.to_string()),
                    );
                }
            });
        let elapsed = start_time.elapsed();

        self.files_searched = outcome.files_searched;
        self.files_found = outcome.files_found;
        self.matches = outcome.matches;
        self.search_elapsed = elapsed;

        frontend.notify(ControllerEvent::SearchFinished {
            files_searched: self.files_searched,
            files_found: self.files_found,
            elapsed,
        });
    }

    fn offer_relocation(
        &mut self,
        frontend: &mut dyn Frontend,
    ) -> Result<Option<RelocationReport>, ControllerError> {
        self.state = ControllerState::AwaitingAction;

        let mode = match frontend.choose_action(self.files_found)? {
            RelocationChoice::ShowOnly => return Ok(None),
            RelocationChoice::Copy => RelocationMode::Copy,
            RelocationChoice::Move => RelocationMode::Move,
        };

        let Some(dest_dir) = frontend.destination_dir()? else {
            let _ = self.logger.log_message("未提供目标目录，只显示结果");
            frontend.notify(ControllerEvent::NoDestination);
            return Ok(None);
        };

        if mode == RelocationMode::Move && !frontend.confirm_move()? {
            let _ = self.logger.log_message("用户取消了移动");
            frontend.notify(ControllerEvent::MoveCancelled);
            return Ok(None);
        }

        self.prepare_destination(&dest_dir, frontend);

        self.state = ControllerState::Relocating;
        Ok(Some(self.relocate(&dest_dir, mode, frontend)))
    }

    /// 目标目录不存在时创建；失败只报告，后续每个文件会各自失败
    fn prepare_destination(&self, dest_dir: &Path, frontend: &mut dyn Frontend) {
        if self.fs.exists(dest_dir) {
            return;
        }

        frontend.notify(ControllerEvent::CreatingDestination(dest_dir));
        if let Err(error) = self.fs.create_dir_all(dest_dir) {
            let _ = self.error_logger.log_error(
                ErrorType::CreateDirectory,
                Some(dest_dir),
                "无法创建目标目录",
                Some(&error.to_string()),
            );
            frontend.notify(ControllerEvent::DestinationFailed { path: dest_dir, error: &error });
        }
    }

    fn relocate(
        &self,
        dest_dir: &Path,
        mode: RelocationMode,
        frontend: &mut dyn Frontend,
    ) -> RelocationReport {
        frontend.notify(ControllerEvent::RelocationStarted {
            mode,
            count: self.matches.len(),
            dest_dir,
        });

        let logger = self.logger;
        let error_logger = self.error_logger;
        let report = Relocator::new(self.fs)
            .with_max_collision_suffix(self.config.relocation.max_collision_suffix)
            .relocate(&self.matches, dest_dir, mode, |entry| {
                log_relocation(logger, error_logger, entry);
                frontend.notify(ControllerEvent::Relocated(entry));
            });

        let _ = logger.log_message(&format!(
            "{}完成: {}/{} 个文件",
            mode, report.succeeded, report.attempted
        ));
        frontend.notify(ControllerEvent::RelocationFinished(&report));
        report
    }
}

fn log_relocation(logger: &dyn LoggerTrait, error_logger: &ErrorLogger, entry: &RelocationEntry) {
    let source = entry.source.as_path();
    match &entry.outcome {
        RelocationOutcome::Copied { .. } | RelocationOutcome::Moved { .. } => {
            let _ = logger.log_file(source, &format!("-> {}", entry.destination.display()));
        }
        RelocationOutcome::CopyFailed { error } => {
            let _ = error_logger.log_error(
                ErrorType::Copy,
                Some(source),
                "复制失败",
                Some(&error.to_string()),
            );
        }
        RelocationOutcome::RemoveFailed { error, rollback_error } => {
            let _ = error_logger.log_error(
                ErrorType::Remove,
                Some(source),
                "已复制但无法删除源文件，已回滚",
                Some(&error.to_string()),
            );
            if let Some(rollback_error) = rollback_error {
                let _ = error_logger.log_error(
                    ErrorType::Rollback,
                    Some(&entry.destination),
                    "回滚时无法删除目标副本",
                    Some(&rollback_error.to_string()),
                );
            }
        }
    }
}
