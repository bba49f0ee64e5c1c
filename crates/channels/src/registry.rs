use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::debug;

use crate::{auth::AuthNode, host::NodeRegistry};

/// In-memory registry of authentication nodes, keyed by node id.
pub struct AuthNodeRegistry {
    nodes: RwLock<HashMap<String, Arc<dyn AuthNode>>>,
}

impl Default for AuthNodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthNodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, id: impl Into<String>, node: Arc<dyn AuthNode>) {
        let id = id.into();
        debug!(auth_node = %id, "registering auth node");
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        nodes.insert(id, node);
    }

    pub fn list(&self) -> Vec<String> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = nodes.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl NodeRegistry for AuthNodeRegistry {
    fn auth_node(&self, id: &str) -> Option<Arc<dyn AuthNode>> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        nodes.get(id).cloned()
    }
}
