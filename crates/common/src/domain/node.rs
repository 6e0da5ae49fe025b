use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::result::{BridgeError, BridgeResult};

/// Domain entity for a mesh node's identity metadata
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub address: i64,
    pub hardware: i64,
    pub longname: String,
    pub shortname: String,
}

/// Input for storing node metadata (insert-or-replace by address)
#[derive(Debug, Clone)]
pub struct UpsertNodeInput {
    pub address: i64,
    pub hardware: i64,
    pub longname: String,
    pub shortname: String,
}

/// Directory of node identities, keyed by integer mesh address.
///
/// Written only when a nodeinfo message arrives, read by every enrichment
/// lookup. The latest upsert for an address always wins; there is no
/// versioning. A lookup miss is not an error, the caller decides what a
/// missing identity means.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// Insert or replace the record at the input's address
    async fn upsert_node(&self, input: UpsertNodeInput) -> BridgeResult<()>;

    /// Bounded-time read of the current record for an address
    async fn lookup_node(&self, address: i64) -> BridgeResult<Option<NodeRecord>>;
}

/// In-memory directory backend for tests and single-process deployments.
///
/// Readers may run concurrently with each other but never with a writer,
/// which is the discipline the pipeline requires when embedded as a library
/// with multiple concurrent callers.
#[derive(Default)]
pub struct InMemoryNodeDirectory {
    nodes: RwLock<HashMap<i64, NodeRecord>>,
}

impl InMemoryNodeDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NodeDirectory for InMemoryNodeDirectory {
    async fn upsert_node(&self, input: UpsertNodeInput) -> BridgeResult<()> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| BridgeError::Repository(anyhow::anyhow!("node directory lock poisoned")))?;
        nodes.insert(
            input.address,
            NodeRecord {
                address: input.address,
                hardware: input.hardware,
                longname: input.longname,
                shortname: input.shortname,
            },
        );
        Ok(())
    }

    async fn lookup_node(&self, address: i64) -> BridgeResult<Option<NodeRecord>> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| BridgeError::Repository(anyhow::anyhow!("node directory lock poisoned")))?;
        Ok(nodes.get(&address).cloned())
    }
}
