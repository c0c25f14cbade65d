use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::search::MatchRecord;
use crate::infrastructure::{join_path, FileSystem};

/// 默认的最大冲突后缀
pub const DEFAULT_MAX_COLLISION_SUFFIX: u32 = 999;

/// 搬移方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationMode {
    Copy,
    Move,
}

impl fmt::Display for RelocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelocationMode::Copy => write!(f, "复制"),
            RelocationMode::Move => write!(f, "移动"),
        }
    }
}

/// 单个文件的搬移结果
#[derive(Debug)]
pub enum RelocationOutcome {
    Copied { bytes: u64 },
    Moved { bytes: u64 },
    /// 复制失败，源文件保持不变
    CopyFailed { error: io::Error },
    /// 复制成功但删除源文件失败，已尝试删除目标副本
    RemoveFailed {
        error: io::Error,
        rollback_error: Option<io::Error>,
    },
}

impl RelocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RelocationOutcome::Copied { .. } | RelocationOutcome::Moved { .. })
    }

    pub fn bytes(&self) -> u64 {
        match self {
            RelocationOutcome::Copied { bytes } | RelocationOutcome::Moved { bytes } => *bytes,
            _ => 0,
        }
    }
}

#[derive(Debug)]
pub struct RelocationEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub outcome: RelocationOutcome,
}

impl RelocationEntry {
    /// 用于显示的文件名
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .unwrap_or(self.source.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

/// 一批搬移的汇总
#[derive(Debug)]
pub struct RelocationReport {
    pub mode: RelocationMode,
    pub attempted: usize,
    pub succeeded: usize,
    pub bytes_copied: u64,
    pub entries: Vec<RelocationEntry>,
}

impl RelocationReport {
    fn new(mode: RelocationMode) -> Self {
        Self {
            mode,
            attempted: 0,
            succeeded: 0,
            bytes_copied: 0,
            entries: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// 把文件名拆成主名和扩展名（含点），按最后一个点拆分
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) => file_name.split_at(idx),
        None => (file_name, ""),
    }
}

/// 计算不冲突的目标路径
///
/// 目标不存在时直接使用；否则依次尝试 `主名_1.扩展名` 到 `主名_N.扩展名`。
/// 全部被占用时退回原始路径，此时会覆盖已有文件。
pub fn unique_destination<F: FileSystem + ?Sized>(
    fs: &F,
    dest_dir: &Path,
    file_name: &OsStr,
    max_suffix: u32,
) -> PathBuf {
    let candidate = join_path(dest_dir, file_name);
    if !fs.exists(&candidate) {
        return candidate;
    }

    let name = file_name.to_string_lossy();
    let (stem, ext) = split_file_name(&name);

    (1..=max_suffix)
        .map(|i| join_path(dest_dir, format!("{}_{}{}", stem, i, ext)))
        .find(|probe| !fs.exists(probe))
        .unwrap_or(candidate)
}

/// 把匹配文件复制或移动到目标目录
pub struct Relocator<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    max_collision_suffix: u32,
}

impl<'a, F: FileSystem + ?Sized> Relocator<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self {
            fs,
            max_collision_suffix: DEFAULT_MAX_COLLISION_SUFFIX,
        }
    }

    pub fn with_max_collision_suffix(mut self, max_suffix: u32) -> Self {
        self.max_collision_suffix = max_suffix;
        self
    }

    /// 按顺序处理每个匹配，单个文件失败不影响其余文件
    pub fn relocate<C>(
        &self,
        matches: &[MatchRecord],
        dest_dir: &Path,
        mode: RelocationMode,
        mut on_entry: C,
    ) -> RelocationReport
    where
        C: FnMut(&RelocationEntry),
    {
        let mut report = RelocationReport::new(mode);

        for record in matches {
            let entry = self.relocate_one(&record.full_path, dest_dir, mode);

            report.attempted += 1;
            if entry.outcome.is_success() {
                report.succeeded += 1;
                report.bytes_copied += entry.outcome.bytes();
            }

            on_entry(&entry);
            report.entries.push(entry);
        }

        report
    }

    fn relocate_one(&self, source: &Path, dest_dir: &Path, mode: RelocationMode) -> RelocationEntry {
        let file_name = source.file_name().unwrap_or(source.as_os_str());
        // 每次都检查当前的文件系统状态，同批次先前写入的文件也会参与冲突判断
        let destination =
            unique_destination(self.fs, dest_dir, file_name, self.max_collision_suffix);

        let outcome = match self.fs.copy_file(source, &destination) {
            Err(error) => RelocationOutcome::CopyFailed { error },
            Ok(bytes) if mode == RelocationMode::Copy => RelocationOutcome::Copied { bytes },
            Ok(bytes) => match self.fs.remove_file(source) {
                Ok(()) => RelocationOutcome::Moved { bytes },
                Err(error) => RelocationOutcome::RemoveFailed {
                    error,
                    // 尽力删除刚复制出的副本，避免留下重复文件
                    rollback_error: self.fs.remove_file(&destination).err(),
                },
            },
        };

        RelocationEntry {
            source: source.to_path_buf(),
            destination,
            outcome,
        }
    }
}
