use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;

/// 日志记录器trait
pub trait LoggerTrait {
    fn is_enabled(&self) -> bool;
    fn log_message(&self, message: &str) -> Result<()>;
    fn log_file(&self, path: &Path, status: &str) -> Result<()>;
    fn finalize(&self, files_searched: u64, files_found: u64, duration: Duration) -> Result<()>;
}

/// 调试日志记录器（记录搜索参数、扫描过的文件和搬移结果）
pub struct Logger {
    log_file: Mutex<Option<File>>,
    log_path: PathBuf,
    enabled: bool,
}

impl Logger {
    /// 创建新的日志记录器
    pub fn new(enabled: bool) -> Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");
        let log_path = PathBuf::from(format!("searchmyfiles_debug_{}.log", timestamp));
        Self::create_at(log_path)
    }

    /// 不写任何内容的日志记录器
    pub fn disabled() -> Self {
        Self {
            log_file: Mutex::new(None),
            log_path: PathBuf::new(),
            enabled: false,
        }
    }

    /// 在指定路径创建日志文件
    pub fn create_at(log_path: PathBuf) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        // 写入UTF-8 BOM以确保文件被正确识别为UTF-8
        file.write_all(&[0xEF, 0xBB, 0xBF])?;
        writeln!(file, "# SearchMyFiles 调试日志")?;
        writeln!(file, "# 开始时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file, "# --------------------------------------------")?;

        Ok(Self {
            log_file: Mutex::new(Some(file)),
            log_path,
            enabled: true,
        })
    }

    /// 获取日志文件路径
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn write_line(&self, line: &str) -> Result<()> {
        if let Ok(mut file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "{}", line)?;
                file.flush()?;
            }
        }
        Ok(())
    }
}

impl LoggerTrait for Logger {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn log_message(&self, message: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        self.write_line(&format!("[{}] {}", timestamp, message))
    }

    fn log_file(&self, path: &Path, status: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        self.write_line(&format!("[{}] 文件: {} | 状态: {}", timestamp, path.display(), status))
    }

    fn finalize(&self, files_searched: u64, files_found: u64, duration: Duration) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.write_line("# --------------------------------------------")?;
        self.write_line(&format!("# 完成时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S")))?;
        self.write_line(&format!("# 总用时: {:.3}秒", duration.as_secs_f64()))?;
        self.write_line(&format!("# 搜索文件数: {}", files_searched))?;
        self.write_line(&format!("# 匹配文件数: {}", files_found))?;
        self.write_line("# ============================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_disabled_logger() {
        let logger = Logger::new(false).unwrap();
        assert!(!logger.is_enabled());
        assert!(logger.log_message("ignored").is_ok());
        assert!(logger.log_path().as_os_str().is_empty());
    }

    #[test]
    fn test_logger_writes_lines() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("debug.log");
        let logger = Logger::create_at(path.clone()).unwrap();
        let logger_trait: &dyn LoggerTrait = &logger;

        assert!(logger_trait.is_enabled());
        logger_trait.log_message("test message").unwrap();
        logger_trait.log_file(Path::new("a.txt"), "匹配").unwrap();
        logger_trait.finalize(2, 1, Duration::from_millis(1500)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("test message"));
        assert!(content.contains("a.txt | 状态: 匹配"));
        assert!(content.contains("# 搜索文件数: 2"));
        assert!(content.contains("# 匹配文件数: 1"));
    }
}
