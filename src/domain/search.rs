use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::infrastructure::FileSystem;

/// 输入校验错误，出现时在遍历开始前终止运行
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("路径 '{}' 不存在", .0.display())]
    PathNotFound(PathBuf),
    #[error("未提供搜索文本")]
    EmptySearchText,
}

/// 经过校验的搜索请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    root_path: PathBuf,
    search_text: String,
}

impl SearchRequest {
    /// 校验根路径存在且搜索文本非空
    pub fn new<F: FileSystem + ?Sized>(
        fs: &F,
        root_path: impl Into<PathBuf>,
        search_text: impl Into<String>,
    ) -> Result<Self, InputError> {
        let root_path = root_path.into();
        let search_text = search_text.into();

        if !fs.exists(&root_path) {
            return Err(InputError::PathNotFound(root_path));
        }
        if search_text.is_empty() {
            return Err(InputError::EmptySearchText);
        }

        Ok(Self { root_path, search_text })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }
}

/// 一个匹配的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub full_path: PathBuf,
}

impl MatchRecord {
    pub fn new(full_path: PathBuf) -> Self {
        Self { full_path }
    }
}
