use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use humansize::{format_size, BINARY};

use crate::domain::{RelocationEntry, RelocationMode, RelocationOutcome, RelocationReport};

/// 格式化文件大小
pub fn format_file_size(size: u64) -> String {
    format_size(size, BINARY)
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}.{:03}s", secs, duration.subsec_millis())
    }
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

pub fn print_banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "=== SearchMyFiles 文件内容搜索 ===")?;
    writeln!(out)
}

/// 输出匹配的文件
pub fn print_found(out: &mut impl Write, path: &Path, color: bool) -> io::Result<()> {
    writeln!(out, "{} {}", paint("找到:", "1;32", color), path.display())
}

/// 搜索摘要
pub struct SearchSummary {
    pub files_searched: u64,
    pub files_found: u64,
    pub elapsed: Duration,
}

impl SearchSummary {
    pub fn print(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\n=== 搜索完成 ===")?;
        writeln!(out, "总用时: {}", format_duration(self.elapsed))?;
        writeln!(out, "搜索文件: {}", self.files_searched)?;
        writeln!(out, "包含文本的文件: {}", self.files_found)
    }
}

/// 输出单个文件的搬移结果
pub fn print_relocation_entry(
    out: &mut impl Write,
    entry: &RelocationEntry,
    color: bool,
) -> io::Result<()> {
    let name = entry.file_name();
    match &entry.outcome {
        RelocationOutcome::Copied { .. } => writeln!(out, "已复制: {}", name),
        RelocationOutcome::Moved { .. } => writeln!(out, "已移动: {}", name),
        RelocationOutcome::CopyFailed { error } => {
            writeln!(out, "{} {} ({})", paint("失败:", "1;31", color), name, error)
        }
        RelocationOutcome::RemoveFailed { rollback_error, .. } => {
            writeln!(out, "{} {}", paint("已复制但无法删除源文件:", "1;31", color), name)?;
            if rollback_error.is_some() {
                writeln!(out, "  目标副本也未能删除: {}", entry.destination.display())?;
            }
            Ok(())
        }
    }
}

/// 输出搬移汇总
pub fn print_relocation_summary(out: &mut impl Write, report: &RelocationReport) -> io::Result<()> {
    let verb = match report.mode {
        RelocationMode::Copy => "已复制",
        RelocationMode::Move => "已移动",
    };
    writeln!(
        out,
        "\n{}: {}/{} 个文件 ({})",
        verb,
        report.succeeded,
        report.attempted,
        format_file_size(report.bytes_copied)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(2048), "2 KiB");
    }

    #[test]
    fn test_found_line_color() {
        let plain = render(|out| print_found(out, Path::new("/r/a.txt"), false));
        assert_eq!(plain, "找到: /r/a.txt\n");

        let colored = render(|out| print_found(out, Path::new("/r/a.txt"), true));
        assert!(colored.starts_with("\x1b[1;32m找到:\x1b[0m"));
    }

    #[test]
    fn test_relocation_lines() {
        let entry = RelocationEntry {
            source: PathBuf::from("/r/a.txt"),
            destination: PathBuf::from("/d/a.txt"),
            outcome: RelocationOutcome::RemoveFailed {
                error: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                rollback_error: None,
            },
        };
        let text = render(|out| print_relocation_entry(out, &entry, false));
        assert_eq!(text, "已复制但无法删除源文件: a.txt\n");

        let report = RelocationReport {
            mode: RelocationMode::Move,
            attempted: 2,
            succeeded: 1,
            bytes_copied: 1024,
            entries: Vec::new(),
        };
        let text = render(|out| print_relocation_summary(out, &report));
        assert_eq!(text, "\n已移动: 1/2 个文件 (1 KiB)\n");
    }

    #[test]
    fn test_summary() {
        let summary = SearchSummary {
            files_searched: 2,
            files_found: 1,
            elapsed: Duration::from_millis(10),
        };
        let text = render(|out| summary.print(out));
        assert!(text.contains("搜索文件: 2"));
        assert!(text.contains("包含文本的文件: 1"));
    }
}
