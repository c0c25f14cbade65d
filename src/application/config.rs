use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::classifier::{
    normalize_extension, ClassificationRules, DEFAULT_BINARY_EXTENSIONS, DEFAULT_TEXT_EXTENSIONS,
};
use crate::domain::file_walker::DEFAULT_PROGRESS_INTERVAL;
use crate::domain::matcher::DEFAULT_CHUNK_LIMIT;
use crate::domain::relocator::DEFAULT_MAX_COLLISION_SUFFIX;

/// 应用程序配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 扩展名分类配置
    pub classification: ClassificationConfig,
    /// 搜索相关配置
    pub search: SearchConfig,
    /// 搬移相关配置
    pub relocation: RelocationConfig,
    /// 显示相关配置
    pub display: DisplayConfig,
}

/// 扩展名分类配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// 参与搜索的文本扩展名
    pub text_extensions: Vec<String>,
    /// 明确跳过的二进制扩展名
    pub binary_extensions: Vec<String>,
}

/// 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 每次读取的最大字节数（超长行会被截断）
    pub line_buffer_size: usize,
    /// 每搜索多少个文件报告一次进度
    pub progress_interval: u64,
}

/// 搬移配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocationConfig {
    /// 文件名冲突时尝试的最大后缀
    pub max_collision_suffix: u32,
}

/// 显示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 是否使用颜色高亮
    pub color: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            text_extensions: DEFAULT_TEXT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            binary_extensions: DEFAULT_BINARY_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            line_buffer_size: DEFAULT_CHUNK_LIMIT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            max_collision_suffix: DEFAULT_MAX_COLLISION_SUFFIX,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// 从配置文件加载配置，如果文件不存在则创建默认配置文件
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            let config = Self::default();
            config.save_to_file(config_path)?;
            println!("已创建默认配置文件: {}", config_path.display());
            Ok(config)
        }
    }

    /// 从文件加载配置
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("无法读取配置文件: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("无法序列化配置")?;

        fs::write(config_path, content)
            .with_context(|| format!("无法写入配置文件: {}", config_path.display()))?;

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.search.line_buffer_size < 16 || self.search.line_buffer_size > 1024 * 1024 {
            anyhow::bail!("line_buffer_size 必须在 16-1048576 之间");
        }

        if self.search.progress_interval == 0 {
            anyhow::bail!("progress_interval 必须大于 0");
        }

        if self.relocation.max_collision_suffix == 0
            || self.relocation.max_collision_suffix > 100_000
        {
            anyhow::bail!("max_collision_suffix 必须在 1-100000 之间");
        }

        if self
            .classification
            .text_extensions
            .iter()
            .any(|ext| normalize_extension(ext).is_empty())
        {
            anyhow::bail!("text_extensions 不能包含空扩展名");
        }

        Ok(())
    }

    /// 根据配置构建分类规则
    pub fn classification_rules(&self) -> ClassificationRules {
        ClassificationRules::new(
            &self.classification.text_extensions,
            &self.classification.binary_extensions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.line_buffer_size, 8192);
        assert_eq!(config.search.progress_interval, 100);
        assert_eq!(config.relocation.max_collision_suffix, 999);
        assert!(config.classification.text_extensions.contains(&"txt".to_string()));
        assert!(config.classification.binary_extensions.contains(&"png".to_string()));
        assert!(config.display.color);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [search]
            progress_interval = 10

            [classification]
            text_extensions = [".RS", "toml"]
            "#,
        )
        .unwrap();

        assert_eq!(config.search.progress_interval, 10);
        assert_eq!(config.search.line_buffer_size, 8192);
        assert_eq!(config.relocation.max_collision_suffix, 999);

        let rules = config.classification_rules();
        assert!(rules.should_search("main.rs"));
        assert!(rules.should_search("Cargo.toml"));
        assert!(!rules.should_search("a.txt"));
        assert!(!rules.should_search("a.png"));
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&config_path).unwrap();
        assert!(config_path.exists());

        let mut modified = created.clone();
        modified.relocation.max_collision_suffix = 5;
        modified.save_to_file(&config_path).unwrap();

        let loaded = Config::load_or_create(&config_path).unwrap();
        assert_eq!(loaded.relocation.max_collision_suffix, 5);
        assert_eq!(loaded.classification.text_extensions, created.classification.text_extensions);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.search.line_buffer_size = 4;
        assert!(config.validate().is_err());

        config = Config::default();
        config.search.progress_interval = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.relocation.max_collision_suffix = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.classification.text_extensions.push(".".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[search]\nprogress_interval = 0\n").unwrap();

        assert!(Config::load_from_file(&config_path).is_err());
    }
}
