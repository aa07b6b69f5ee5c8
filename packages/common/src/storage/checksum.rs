use sha2::{Digest, Sha256};

/// Incremental SHA-256 over a file's content, fed one chunk at a time.
#[derive(Default)]
pub struct Checksum(Sha256);

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    /// Lowercase hex digest.
    pub fn finish(self) -> String {
        hex::encode(self.0.finalize())
    }
}
