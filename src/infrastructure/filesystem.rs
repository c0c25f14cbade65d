use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// 目录项信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub name: OsString,
    /// 目录本身（指向目录的符号链接不算）
    pub is_dir: bool,
    /// 普通文件；符号链接按其目标判断，管道、套接字和设备文件都不算
    pub is_file: bool,
}

/// 文件系统能力接口，核心逻辑只通过它访问磁盘
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    /// 列出目录项，顺序即底层文件系统给出的顺序（不排序）
    fn list_entries(&self, path: &Path) -> io::Result<Vec<FsEntry>>;
    fn open_for_read(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>>;
    /// 复制文件，目标已存在时覆盖，返回复制的字节数
    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    /// 创建目录（含父目录），已存在时视为成功
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// 拼接目录与名称，统一使用平台分隔符，不做规范化
pub fn join_path(dir: &Path, name: impl AsRef<OsStr>) -> PathBuf {
    dir.join(name.as_ref())
}

/// 基于 std::fs 的真实文件系统
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            // 单个目录项出错时跳过，不影响同目录其他项
            let Ok(entry) = entry else { continue };
            let Ok(file_type) = entry.file_type() else { continue };
            let is_file = if file_type.is_symlink() {
                fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false)
            } else {
                file_type.is_file()
            };
            entries.push(FsEntry {
                name: entry.file_name(),
                is_dir: file_type.is_dir(),
                is_file,
            });
        }
        Ok(entries)
    }

    fn open_for_read(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        fs::copy(src, dst)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

/// 内存文件系统，用于在没有真实磁盘的情况下测试遍历与搬移逻辑
///
/// 目录项按插入顺序返回，模拟文件系统给出的枚举顺序。
/// 可以把路径标记为不可列出、不可读取或不可删除，以覆盖各种错误路径。
#[derive(Debug, Default)]
pub struct InMemoryFs {
    state: std::cell::RefCell<MemState>,
}

#[derive(Debug, Default)]
struct MemState {
    /// 目录 -> 按插入顺序排列的子项名称
    dirs: BTreeMap<PathBuf, Vec<OsString>>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    deny_list: Vec<PathBuf>,
    deny_read: Vec<PathBuf>,
    deny_remove: Vec<PathBuf>,
    deny_write: Vec<PathBuf>,
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("权限不足: {}", path.display()),
    )
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("路径不存在: {}", path.display()),
    )
}

impl MemState {
    fn register(&mut self, path: &Path, is_dir: bool) {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !self.dirs.contains_key(parent) {
                self.register(parent, true);
            }
            if let (Some(children), Some(name)) = (self.dirs.get_mut(parent), path.file_name()) {
                if !children.iter().any(|c| c.as_os_str() == name) {
                    children.push(name.to_os_string());
                }
            }
        }
        if is_dir {
            self.dirs.entry(path.to_path_buf()).or_default();
        }
    }

    fn unregister(&mut self, path: &Path) {
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(children) = self.dirs.get_mut(parent) {
                children.retain(|c| c.as_os_str() != name);
            }
        }
    }
}

impl InMemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加目录（自动补齐父目录）
    pub fn add_dir(&self, path: impl AsRef<Path>) -> &Self {
        self.state.borrow_mut().register(path.as_ref(), true);
        self
    }

    /// 添加文件（自动补齐父目录）
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> &Self {
        let path = path.as_ref();
        let mut state = self.state.borrow_mut();
        state.register(path, false);
        state.files.insert(path.to_path_buf(), content.as_ref().to_vec());
        self
    }

    /// 之后对该目录的列出操作将返回权限错误
    pub fn deny_listing(&self, path: impl AsRef<Path>) -> &Self {
        self.state.borrow_mut().deny_list.push(path.as_ref().to_path_buf());
        self
    }

    /// 之后对该文件的读取（打开与作为复制源）将返回权限错误
    pub fn deny_reading(&self, path: impl AsRef<Path>) -> &Self {
        self.state.borrow_mut().deny_read.push(path.as_ref().to_path_buf());
        self
    }

    /// 之后对该文件的删除将返回权限错误
    pub fn deny_removal(&self, path: impl AsRef<Path>) -> &Self {
        self.state.borrow_mut().deny_remove.push(path.as_ref().to_path_buf());
        self
    }

    /// 之后向该路径写入（复制目标、创建目录）将返回权限错误
    pub fn deny_writing(&self, path: impl AsRef<Path>) -> &Self {
        self.state.borrow_mut().deny_write.push(path.as_ref().to_path_buf());
        self
    }

    /// 读取文件内容
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state.borrow().files.get(path.as_ref()).cloned()
    }

    pub fn is_file(&self, path: impl AsRef<Path>) -> bool {
        self.state.borrow().files.contains_key(path.as_ref())
    }

    /// 列出目录下的文件名（按插入顺序）
    pub fn file_names(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let state = self.state.borrow();
        let dir = dir.as_ref();
        state
            .dirs
            .get(dir)
            .map(|children| {
                children
                    .iter()
                    .filter(|name| state.files.contains_key(&dir.join(name)))
                    .map(|name| name.to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FileSystem for InMemoryFs {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.borrow();
        state.dirs.contains_key(path) || state.files.contains_key(path)
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        let state = self.state.borrow();
        if state.deny_list.iter().any(|p| p == path) {
            return Err(permission_denied(path));
        }
        let children = state.dirs.get(path).ok_or_else(|| not_found(path))?;
        Ok(children
            .iter()
            .map(|name| {
                let full_path = path.join(name);
                FsEntry {
                    name: name.clone(),
                    is_dir: state.dirs.contains_key(&full_path),
                    is_file: state.files.contains_key(&full_path),
                }
            })
            .collect())
    }

    fn open_for_read(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let state = self.state.borrow();
        if state.deny_read.iter().any(|p| p == path) {
            return Err(permission_denied(path));
        }
        let content = state.files.get(path).ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(content.clone())))
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        let mut state = self.state.borrow_mut();
        if state.deny_read.iter().any(|p| p == src) {
            return Err(permission_denied(src));
        }
        if state.deny_write.iter().any(|p| p == dst || dst.parent() == Some(p.as_path())) {
            return Err(permission_denied(dst));
        }
        let content = state.files.get(src).cloned().ok_or_else(|| not_found(src))?;
        match dst.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !state.dirs.contains_key(parent) => {
                return Err(not_found(parent));
            }
            _ => {}
        }
        if state.dirs.contains_key(dst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("目标是目录: {}", dst.display()),
            ));
        }
        let len = content.len() as u64;
        state.register(dst, false);
        state.files.insert(dst.to_path_buf(), content);
        Ok(len)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.deny_remove.iter().any(|p| p == path) {
            return Err(permission_denied(path));
        }
        if state.files.remove(path).is_none() {
            return Err(not_found(path));
        }
        state.unregister(path);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.deny_write.iter().any(|p| p == path) {
            return Err(permission_denied(path));
        }
        if state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("同名文件已存在: {}", path.display()),
            ));
        }
        state.register(path, true);
        Ok(())
    }
}
