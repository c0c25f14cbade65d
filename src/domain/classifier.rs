use std::collections::HashSet;

/// 默认参与搜索的文本扩展名
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "log", "cfg", "conf", "ini", "sh", "bash", "py", "js", "html", "css", "xml",
    "json", "csv", "yaml", "yml", "c", "h", "cpp", "hpp",
];

/// 默认跳过的二进制扩展名
pub const DEFAULT_BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "bin", "zip", "rar", "7z", "tar", "gz", "jpg", "jpeg", "png", "gif", "bmp",
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "msi", "iso", "img", "pyc",
];

/// 规范化扩展名：去掉开头的点并转为小写
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// 取文件名的扩展名（不含点，小写）
///
/// 没有点，或唯一的点在首位（隐藏文件）时返回 None。
pub fn extension_of(filename: &str) -> Option<String> {
    match filename.rfind('.') {
        None | Some(0) => None,
        Some(idx) => Some(filename[idx + 1..].to_ascii_lowercase()),
    }
}

/// 按扩展名判断文件是否需要搜索
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    text_extensions: HashSet<String>,
    binary_extensions: HashSet<String>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_EXTENSIONS, DEFAULT_BINARY_EXTENSIONS)
    }
}

impl ClassificationRules {
    pub fn new<T, B>(text_extensions: &[T], binary_extensions: &[B]) -> Self
    where
        T: AsRef<str>,
        B: AsRef<str>,
    {
        Self {
            text_extensions: text_extensions
                .iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
            binary_extensions: binary_extensions
                .iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    pub fn is_text_extension(&self, ext: &str) -> bool {
        self.text_extensions.contains(ext)
    }

    pub fn is_binary_extension(&self, ext: &str) -> bool {
        self.binary_extensions.contains(ext)
    }

    /// 只有识别出的文本扩展名才搜索；未知扩展名一律不搜索
    pub fn should_search(&self, filename: &str) -> bool {
        let Some(ext) = extension_of(filename) else {
            return false;
        };

        // 即使两个集合有重叠，二进制名单优先
        if self.is_binary_extension(&ext) {
            return false;
        }

        self.is_text_extension(&ext)
    }
}
