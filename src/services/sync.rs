//! 同步控制器：加载 / 保存 / 重新解析
//!
//! 状态机：
//! - `Empty`：未命名的空文档
//! - `Loaded(path)`：缓冲区与磁盘一致
//! - `Modified(path?)`：缓冲区有未保存的修改
//! - `SaveFailed(path)`：最近一次写入失败，缓冲区与修改标记保持不变
//!
//! 树视图快照总是由最近一次成功解析的磁盘内容整体重建，从不局部修补。
//! 保存后重新读取刚写入的文件再投影，而不是复用内存中的文档。

use super::config::EditorConfig;
use super::file::{FileError, FileProvider, LocalFileProvider};
use crate::models::{Document, DocumentStore, ProjectedNode, TextBuffer};
use crate::projection::{project, DepthExceeded};
use crate::xml::{parse_str, parse_with, ParseError};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Empty,
    Loaded(PathBuf),
    Modified(Option<PathBuf>),
    SaveFailed(PathBuf),
}

impl SyncState {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncState::Empty | SyncState::Modified(None) => None,
            SyncState::Loaded(p) | SyncState::Modified(Some(p)) | SyncState::SaveFailed(p) => {
                Some(p.as_path())
            }
        }
    }
}

#[derive(Debug)]
pub enum SyncError {
    Io { path: PathBuf, source: FileError },
    Parse(ParseError),
    DepthExceeded(DepthExceeded),
    /// 未命名或不可写的路径，需要调用方先提供文件名
    NeedsSaveAs,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            SyncError::Parse(e) => write!(f, "parse error at {}", e),
            SyncError::DepthExceeded(e) => write!(f, "{}", e),
            SyncError::NeedsSaveAs => write!(f, "document has no writable file name"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Io { source, .. } => Some(source),
            SyncError::Parse(e) => Some(e),
            SyncError::DepthExceeded(e) => Some(e),
            SyncError::NeedsSaveAs => None,
        }
    }
}

impl From<ParseError> for SyncError {
    fn from(e: ParseError) -> Self {
        SyncError::Parse(e)
    }
}

impl From<DepthExceeded> for SyncError {
    fn from(e: DepthExceeded) -> Self {
        SyncError::DepthExceeded(e)
    }
}

/// 写入成功后的结果；`tree_error` 不为空时文件已正确写入，只是树视图未能刷新
#[derive(Debug)]
pub struct SaveReport {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub tree_error: Option<SyncError>,
}

impl SaveReport {
    pub fn tree_refreshed(&self) -> bool {
        self.tree_error.is_none()
    }
}

/// 关闭或新建前询问用户的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    Save,
    Discard,
    Cancel,
}

/// `:/` 开头的是只读资源路径
pub fn is_resource_path(path: &Path) -> bool {
    path.to_string_lossy().starts_with(":/")
}

pub struct SyncController<P: FileProvider = LocalFileProvider> {
    provider: P,
    config: EditorConfig,
    store: DocumentStore,
    tree: Option<Arc<ProjectedNode>>,
    state: SyncState,
    current_path: Option<PathBuf>,
    generation: u64,
    status: Option<String>,
}

impl SyncController<LocalFileProvider> {
    pub fn local(config: EditorConfig) -> Self {
        Self::new(LocalFileProvider::new(), config)
    }
}

impl<P: FileProvider> SyncController<P> {
    pub fn new(provider: P, config: EditorConfig) -> Self {
        Self {
            provider,
            config,
            store: DocumentStore::new(),
            tree: None,
            state: SyncState::Empty,
            current_path: None,
            generation: 0,
            status: None,
        }
    }

    // ==================== 只读访问 ====================

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// 当前树视图快照，调用方只读持有
    pub fn tree(&self) -> Option<Arc<ProjectedNode>> {
        self.tree.clone()
    }

    pub fn document(&self) -> Option<&Document> {
        self.store.document()
    }

    pub fn buffer(&self) -> &TextBuffer {
        self.store.buffer()
    }

    pub fn text(&self) -> String {
        self.store.text()
    }

    pub fn is_modified(&self) -> bool {
        self.store.is_modified()
    }

    /// 每次树重建或清空时递增
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 最近一次操作的提示信息
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn display_name(&self) -> String {
        self.current_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.config.untitled_name.clone())
    }

    pub fn window_title(&self) -> String {
        let marker = if self.is_modified() { "*" } else { "" };
        format!(
            "{}{} - {}",
            self.display_name(),
            marker,
            self.config.app_name
        )
    }

    // ==================== 状态转换 ====================

    pub fn new_document(&mut self) {
        self.store.clear();
        self.replace_tree(None);
        self.current_path = None;
        self.state = SyncState::Empty;
        self.status = None;
    }

    pub fn set_current_file(&mut self, path: Option<PathBuf>) {
        self.store.mark_modified(false);
        self.state = match &path {
            Some(p) => SyncState::Loaded(p.clone()),
            None => SyncState::Empty,
        };
        self.current_path = path;
    }

    /// 新的缓冲区、文档和树全部构建成功后才替换旧的，失败时保持原状态
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), SyncError> {
        let path = path.as_ref();
        match self.build_from_disk(path) {
            Ok((store, tree)) => {
                let nodes = tree.node_count();
                self.store = store;
                self.replace_tree(Some(tree));
                self.set_current_file(Some(path.to_path_buf()));
                self.status = Some(format!("Opened \"{}\"", path.display()));
                tracing::info!(path = %path.display(), nodes, "document loaded");
                Ok(())
            }
            Err(e) => {
                self.status = Some(format!("Could not open \"{}\": {}", path.display(), e));
                tracing::warn!(path = %path.display(), error = %e, "load failed");
                Err(e)
            }
        }
    }

    pub fn insert(&mut self, char_idx: usize, text: &str) {
        self.edit_with(|buffer| buffer.insert(char_idx, text));
    }

    pub fn delete(&mut self, range: Range<usize>) -> String {
        self.edit_with(|buffer| buffer.delete(range))
    }

    pub fn replace_text(&mut self, text: &str) {
        self.edit_with(|buffer| buffer.replace_all(text));
    }

    /// 外部编辑入口；缓冲区被修改时进入 `Modified`
    pub fn edit_with<R>(&mut self, f: impl FnOnce(&mut TextBuffer) -> R) -> R {
        let result = f(self.store.buffer_mut());
        if self.store.is_modified() {
            self.state = SyncState::Modified(self.current_path.clone());
        }
        result
    }

    pub fn save(&mut self) -> Result<SaveReport, SyncError> {
        let path = match &self.current_path {
            Some(p) if !is_resource_path(p) => p.clone(),
            _ => {
                self.status = Some("Choose a file name to save this document".to_string());
                return Err(SyncError::NeedsSaveAs);
            }
        };
        self.write_and_refresh(path)
    }

    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<SaveReport, SyncError> {
        let path = path.into();
        if path.as_os_str().is_empty() || is_resource_path(&path) {
            return Err(SyncError::NeedsSaveAs);
        }
        self.current_path = Some(path.clone());
        self.state = SyncState::Modified(Some(path.clone()));
        self.write_and_refresh(path)
    }

    /// 返回是否可以继续关闭 / 新建
    pub fn close_guard(&mut self, decision: SaveDecision) -> Result<bool, SyncError> {
        if !self.needs_save_prompt() {
            return Ok(true);
        }
        match decision {
            SaveDecision::Save => self.save().map(|_| true),
            SaveDecision::Discard => Ok(true),
            SaveDecision::Cancel => Ok(false),
        }
    }

    pub fn needs_save_prompt(&self) -> bool {
        self.is_modified()
    }

    // ==================== 内部 ====================

    fn replace_tree(&mut self, tree: Option<ProjectedNode>) {
        self.tree = tree.map(Arc::new);
        self.generation += 1;
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, SyncError> {
        self.provider
            .read_file_bytes(path)
            .map_err(|source| SyncError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn build_from_disk(&self, path: &Path) -> Result<(DocumentStore, ProjectedNode), SyncError> {
        let bytes = self.read(path)?;
        let options = self.config.parse_options();

        let mut store = DocumentStore::new();
        let text = store.load_text(&bytes, options.default_encoding);
        let root = parse_str(&text, &options)?;
        let tree = project(&root, &self.config.project_options())?;
        let encoding = store.encoding();
        store.set_document(Some(Document { root, encoding }));
        Ok((store, tree))
    }

    fn reparse(&self, path: &Path) -> Result<(Document, ProjectedNode), SyncError> {
        let bytes = self.read(path)?;
        let document = parse_with(&bytes, &self.config.parse_options())?;
        let tree = project(&document.root, &self.config.project_options())?;
        Ok((document, tree))
    }

    fn write_and_refresh(&mut self, path: PathBuf) -> Result<SaveReport, SyncError> {
        let bytes = self.store.serialize(self.config.default_encoding());

        if let Err(source) = self.provider.write_file_bytes(&path, &bytes) {
            self.status = Some(format!(
                "Could not write to file \"{}\": {}",
                path.display(),
                source
            ));
            tracing::warn!(path = %path.display(), error = %source, "save failed");
            self.state = SyncState::SaveFailed(path.clone());
            return Err(SyncError::Io { path, source });
        }

        self.store.mark_modified(false);
        self.state = SyncState::Loaded(path.clone());

        let tree_error = match self.reparse(&path) {
            Ok((document, tree)) => {
                self.store.set_document(Some(document));
                self.replace_tree(Some(tree));
                self.status = Some(format!("Wrote \"{}\"", path.display()));
                tracing::info!(path = %path.display(), bytes = bytes.len(), "document saved");
                None
            }
            Err(e) => {
                self.store.set_document(None);
                self.replace_tree(None);
                self.status = Some(format!(
                    "Wrote \"{}\" (tree not refreshed: {})",
                    path.display(),
                    e
                ));
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "document saved but tree rebuild failed"
                );
                Some(e)
            }
        };

        Ok(SaveReport {
            path,
            bytes_written: bytes.len(),
            tree_error,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/sync.rs"]
mod tests;
