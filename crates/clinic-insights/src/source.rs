//! 记录数据源
//!
//! 数据源负责按所有者取回记录快照。聚合层只依赖这个 trait，不关心底层存储。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use clinic_core::{ClinicError, PracticeSnapshot, Result};

/// 记录数据源
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// 加载指定所有者的快照
    async fn load_snapshot(&self, owner_id: &str) -> Result<PracticeSnapshot>;
}

/// 从目录中的 `<owner_id>.json` 读取快照
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    data_dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// 所有者对应的快照文件
    pub fn snapshot_path(&self, owner_id: &str) -> Result<PathBuf> {
        let valid = !owner_id.is_empty()
            && owner_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ClinicError::Validation(format!("非法的所有者ID: {:?}", owner_id)));
        }
        Ok(self.data_dir.join(format!("{}.json", owner_id)))
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn load_snapshot(&self, owner_id: &str) -> Result<PracticeSnapshot> {
        let path = self.snapshot_path(owner_id)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClinicError::NotFound(format!("快照文件 {}", path.display())));
            }
            Err(e) => return Err(e.into()),
        };

        let mut snapshot: PracticeSnapshot = serde_json::from_str(&content)?;
        if snapshot.owner_id.is_empty() {
            snapshot.owner_id = owner_id.to_string();
        } else if snapshot.owner_id != owner_id {
            return Err(ClinicError::Validation(format!(
                "快照所有者 {} 与请求的 {} 不一致",
                snapshot.owner_id, owner_id
            )));
        }

        tracing::info!(
            "Loaded snapshot for owner {} with {} records from {}",
            owner_id,
            snapshot.record_count(),
            path.display()
        );
        Ok(snapshot)
    }
}

/// 内存数据源
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    snapshots: Arc<RwLock<HashMap<String, PracticeSnapshot>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或替换所有者的快照
    pub async fn put(&self, snapshot: PracticeSnapshot) {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(snapshot.owner_id.clone(), snapshot);
    }

    pub async fn remove(&self, owner_id: &str) -> Option<PracticeSnapshot> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.remove(owner_id)
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn load_snapshot(&self, owner_id: &str) -> Result<PracticeSnapshot> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .get(owner_id)
            .cloned()
            .ok_or_else(|| ClinicError::NotFound(format!("所有者 {} 的快照", owner_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_file_source_loads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({
            "patients": [{ "id": "p1", "gender": "Female", "createdAt": "2024-01-01" }],
            "invoices": [{ "id": "i1", "status": "paid", "total": 20 }]
        });
        std::fs::write(dir.path().join("clinic-1.json"), body.to_string()).unwrap();

        let source = JsonFileSource::new(dir.path());
        let snapshot = source.load_snapshot("clinic-1").await.unwrap();
        assert_eq!(snapshot.owner_id, "clinic-1");
        assert_eq!(snapshot.patients.len(), 1);
        assert_eq!(snapshot.invoices[0].total, Some(20.0));
    }

    #[tokio::test]
    async fn test_json_file_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("clinic-2.json"),
            serde_json::json!({ "ownerId": "someone-else" }).to_string(),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let source = JsonFileSource::new(dir.path());
        assert!(matches!(
            source.load_snapshot("clinic-2").await,
            Err(ClinicError::Validation(_))
        ));
        assert!(matches!(
            source.load_snapshot("missing").await,
            Err(ClinicError::NotFound(_))
        ));
        assert!(matches!(
            source.load_snapshot("broken").await,
            Err(ClinicError::Serialization(_))
        ));
        assert!(matches!(
            source.load_snapshot("../etc/passwd").await,
            Err(ClinicError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_in_memory_source() {
        let source = InMemorySource::new();
        source.put(PracticeSnapshot::new("a")).await;

        assert_eq!(source.load_snapshot("a").await.unwrap().owner_id, "a");
        assert!(source.load_snapshot("b").await.is_err());

        assert!(source.remove("a").await.is_some());
        assert!(source.load_snapshot("a").await.is_err());
    }
}
