use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::errors::{HarvestError, SelectorError};
use crate::quotes::{load_document, StoreDocument};

/// 读取上一轮的引用文件；不存在或损坏时返回 `None`
pub async fn load_previous(path: &Path) -> Option<StoreDocument> {
    match load_document(path).await {
        Ok(document) => Some(document),
        Err(SelectorError::StoreNotFound(_)) => None,
        Err(e) => {
            warn!("⚠️ 旧引用文件不可用，忽略翻译缓存: {}", e);
            None
        }
    }
}

/// 原子写入：先写同目录临时文件再重命名，读者不会看到写了一半的文件
pub async fn save_document(path: &Path, document: &StoreDocument) -> Result<(), HarvestError> {
    let json = document.to_json_pretty()?;
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || write_atomic(&target, json.as_bytes()))
        .await
        .map_err(|e| HarvestError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

    info!("💾 引用已保存到 {:?}", path);
    Ok(())
}

fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), HarvestError> {
    let directory = parent_dir(target);
    std::fs::create_dir_all(&directory)?;

    let mut file = NamedTempFile::new_in(&directory)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(target).map_err(|e| HarvestError::IoError(e.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
