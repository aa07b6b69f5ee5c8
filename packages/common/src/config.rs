use serde::Deserialize;

/// Which chunk store backs resume storage.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// Chunks and metadata live in the application database.
    #[default]
    Database,
    /// Process-local maps. Contents are lost on restart.
    Memory,
}

/// App-level resume storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Chunk store backend. Default: "database".
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Size of every stored chunk except a file's last one. Default: 255 KiB.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    /// Largest accepted resume in bytes. Default: 5 MiB.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_chunk_size() -> u32 {
    255 * 1024
}
fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

impl StorageAppConfig {
    /// Reject settings the upload pipeline cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("storage.chunk_size must be greater than 0".into());
        }
        if self.max_file_size == 0 {
            return Err("storage.max_file_size must be greater than 0".into());
        }
        Ok(())
    }
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            chunk_size: default_chunk_size(),
            max_file_size: default_max_file_size(),
        }
    }
}
