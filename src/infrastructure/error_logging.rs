use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use chrono::Local;

/// 错误类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// 目录无法列出
    DirectoryRead,
    /// 文件无法读取
    FileRead,
    /// 复制失败
    Copy,
    /// 删除源文件失败
    Remove,
    /// 回滚时删除目标副本失败
    Rollback,
    /// 创建目标目录失败
    CreateDirectory,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DirectoryRead => "目录读取",
            ErrorType::FileRead => "文件读取",
            ErrorType::Copy => "文件复制",
            ErrorType::Remove => "删除源文件",
            ErrorType::Rollback => "回滚副本",
            ErrorType::CreateDirectory => "创建目录",
        }
    }

    /// 是否属于搬移阶段的错误（需要在控制台汇总）
    pub fn is_relocation(&self) -> bool {
        !matches!(self, ErrorType::DirectoryRead | ErrorType::FileRead)
    }
}

/// 错误日志记录器
///
/// 计数始终进行；只有启用时才写入错误日志文件。
pub struct ErrorLogger {
    error_file: Mutex<Option<File>>,
    error_path: PathBuf,
    enabled: bool,
    error_counts: Mutex<HashMap<ErrorType, usize>>,
}

impl ErrorLogger {
    /// 创建新的错误日志记录器
    pub fn new(enabled: bool) -> Result<Self> {
        if !enabled {
            return Ok(Self {
                error_file: Mutex::new(None),
                error_path: PathBuf::new(),
                enabled: false,
                error_counts: Mutex::new(HashMap::new()),
            });
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        Self::create_at(PathBuf::from(format!("searchmyfiles_error_{}.log", timestamp)))
    }

    /// 在指定路径创建错误日志文件
    pub fn create_at(error_path: PathBuf) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&error_path)?;

        file.write_all(&[0xEF, 0xBB, 0xBF])?; // UTF-8 BOM
        writeln!(file, "# SearchMyFiles 错误日志")?;
        writeln!(file, "# 开始时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file, "# ============================================")?;
        writeln!(file)?;

        Ok(Self {
            error_file: Mutex::new(Some(file)),
            error_path,
            enabled: true,
            error_counts: Mutex::new(HashMap::new()),
        })
    }

    /// 记录错误
    pub fn log_error(
        &self,
        error_type: ErrorType,
        file_path: Option<&Path>,
        message: &str,
        details: Option<&str>,
    ) -> Result<()> {
        if let Ok(mut counts) = self.error_counts.lock() {
            *counts.entry(error_type).or_insert(0) += 1;
        }

        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "[{}] {} - {}", timestamp, error_type.as_str(), message)?;

                if let Some(path) = file_path {
                    writeln!(file, "  文件路径: {}", path.display())?;
                }

                if let Some(detail) = details {
                    writeln!(file, "  详细信息: {}", detail)?;
                }

                writeln!(file)?;
                file.flush()?;
            }
        }

        Ok(())
    }

    /// 获取错误统计信息
    pub fn get_error_summary(&self) -> HashMap<ErrorType, usize> {
        self.error_counts
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    /// 搬移阶段的错误数
    pub fn relocation_errors(&self) -> usize {
        self.get_error_summary()
            .iter()
            .filter(|(error_type, _)| error_type.is_relocation())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn error_path(&self) -> &Path {
        &self.error_path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 完成错误日志记录
    pub fn finalize(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let summary = self.get_error_summary();
        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "# ============================================")?;
                writeln!(file, "# 结束时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;

                if summary.is_empty() {
                    writeln!(file, "# 无错误记录")?;
                } else {
                    writeln!(file, "# 错误统计:")?;
                    for (error_type, count) in &summary {
                        writeln!(file, "#   {}: {} 次", error_type.as_str(), count)?;
                    }
                    writeln!(file, "#   总计: {} 个错误", summary.values().sum::<usize>())?;
                }

                file.flush()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_error_logger_creation() {
        let logger = ErrorLogger::new(false).unwrap();
        assert!(logger.get_error_summary().is_empty());
        assert_eq!(logger.relocation_errors(), 0);
    }

    #[test]
    fn test_disabled_logger_still_counts() {
        let logger = ErrorLogger::new(false).unwrap();
        logger
            .log_error(ErrorType::Copy, Some(Path::new("/a.txt")), "复制失败", None)
            .unwrap();
        logger
            .log_error(ErrorType::DirectoryRead, None, "无法列出目录", None)
            .unwrap();

        assert_eq!(logger.get_error_summary().values().sum::<usize>(), 2);
        assert_eq!(logger.relocation_errors(), 1);
    }

    #[test]
    fn test_error_logging_to_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("error.log");
        let logger = ErrorLogger::create_at(path.clone()).unwrap();

        logger
            .log_error(
                ErrorType::FileRead,
                Some(Path::new("/test/path")),
                "测试错误",
                Some("详细信息"),
            )
            .unwrap();
        logger.finalize().unwrap();

        let summary = logger.get_error_summary();
        assert_eq!(summary.get(&ErrorType::FileRead), Some(&1));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("文件读取 - 测试错误"));
        assert!(content.contains("总计: 1 个错误"));
    }

    #[test]
    fn test_error_types() {
        assert_eq!(ErrorType::FileRead.as_str(), "文件读取");
        assert!(ErrorType::Rollback.is_relocation());
        assert!(!ErrorType::DirectoryRead.is_relocation());
    }
}
