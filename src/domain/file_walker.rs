use std::io;
use std::path::Path;

use crate::domain::classifier::ClassificationRules;
use crate::domain::matcher::TextMatcher;
use crate::domain::search::MatchRecord;
use crate::infrastructure::{join_path, FileSystem};

/// 默认每搜索多少个文件报告一次进度
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// 遍历过程中的旁路通知
#[derive(Debug)]
pub enum WalkEvent<'a> {
    /// 已搜索的文件数达到进度间隔的整数倍
    Progress { files_searched: u64 },
    /// 一个文件搜索完毕（无论是否匹配）
    Searched { path: &'a Path, matched: bool },
    /// 找到匹配文件
    Found(&'a Path),
    /// 目录无法列出，整个子树被跳过
    SkippedDirectory { path: &'a Path, error: &'a io::Error },
    /// 文本文件无法打开，按不匹配处理
    UnreadableFile { path: &'a Path, error: &'a io::Error },
}

/// 遍历结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    /// 按发现顺序排列的匹配
    pub matches: Vec<MatchRecord>,
    pub files_searched: u64,
    pub files_found: u64,
}

/// 深度优先的目录遍历器
pub struct Walker<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    rules: &'a ClassificationRules,
    matcher: &'a TextMatcher,
    progress_interval: u64,
}

impl<'a, F: FileSystem + ?Sized> Walker<'a, F> {
    pub fn new(fs: &'a F, rules: &'a ClassificationRules, matcher: &'a TextMatcher) -> Self {
        Self {
            fs,
            rules,
            matcher,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// 从根目录开始搜索，单个目录或文件出错不会中断遍历
    pub fn search<E>(&self, root: &Path, mut on_event: E) -> WalkOutcome
    where
        E: FnMut(WalkEvent<'_>),
    {
        let mut outcome = WalkOutcome::default();
        self.walk_dir(root, &mut outcome, &mut on_event);
        outcome
    }

    fn walk_dir<E>(&self, dir: &Path, outcome: &mut WalkOutcome, on_event: &mut E)
    where
        E: FnMut(WalkEvent<'_>),
    {
        let entries = match self.fs.list_entries(dir) {
            Ok(entries) => entries,
            Err(error) => {
                on_event(WalkEvent::SkippedDirectory { path: dir, error: &error });
                return;
            }
        };

        for entry in entries {
            let full_path = join_path(dir, &entry.name);

            if entry.is_dir {
                self.walk_dir(&full_path, outcome, on_event);
                continue;
            }

            // 管道、设备等特殊文件打开时可能阻塞，只搜索普通文件
            if !entry.is_file {
                continue;
            }

            if !self.rules.should_search(&entry.name.to_string_lossy()) {
                continue;
            }

            outcome.files_searched += 1;
            if outcome.files_searched % self.progress_interval == 0 {
                on_event(WalkEvent::Progress { files_searched: outcome.files_searched });
            }

            let matched = self.file_matches(&full_path, on_event);
            on_event(WalkEvent::Searched { path: &full_path, matched });
            if matched {
                on_event(WalkEvent::Found(&full_path));
                outcome.matches.push(MatchRecord::new(full_path));
                outcome.files_found += 1;
            }
        }
    }

    /// 打开并匹配单个文件，读取器在返回前关闭
    fn file_matches<E>(&self, path: &Path, on_event: &mut E) -> bool
    where
        E: FnMut(WalkEvent<'_>),
    {
        match self.fs.open_for_read(path) {
            Ok(reader) => self.matcher.contains_text(reader),
            Err(error) => {
                on_event(WalkEvent::UnreadableFile { path, error: &error });
                false
            }
        }
    }
}
