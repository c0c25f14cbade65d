use std::io::{BufRead, Read};

use bstr::ByteSlice;

/// 默认的分块上限（字节）
pub const DEFAULT_CHUNK_LIMIT: usize = 8192;

/// 不区分大小写的文本匹配器
///
/// 文件按行分块读取，每块最多 `chunk_limit` 字节。超长的行会被截成多块，
/// 跨越截断点或跨行的匹配会漏掉；这是已知的近似行为，不是全文扫描。
/// 大小写折叠只处理 ASCII，内容按单字节文本对待。
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: Vec<u8>,
    chunk_limit: usize,
}

impl TextMatcher {
    pub fn new(needle: &str, chunk_limit: usize) -> Self {
        Self {
            needle: needle.as_bytes().to_ascii_lowercase(),
            chunk_limit: chunk_limit.max(1),
        }
    }

    pub fn needle(&self) -> &[u8] {
        &self.needle
    }

    pub fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    /// 找到第一处匹配后立即停止读取；读取出错视为不匹配
    pub fn contains_text<R: BufRead>(&self, mut reader: R) -> bool {
        let mut chunk = Vec::with_capacity(self.chunk_limit);

        loop {
            chunk.clear();
            let read = (&mut reader)
                .take(self.chunk_limit as u64)
                .read_until(b'\n', &mut chunk);

            match read {
                Ok(0) | Err(_) => return false,
                Ok(_) => {
                    chunk.make_ascii_lowercase();
                    if chunk.find(&self.needle).is_some() {
                        return true;
                    }
                }
            }
        }
    }
}
