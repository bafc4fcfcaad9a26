use rand::prelude::*;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// A scratch directory under the system temp dir, removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new() -> TempDir {
        let mut id = [0u8; 8];
        thread_rng().fill(&mut id);

        let path = env::temp_dir().join(format!("labshield-{}", hex::encode(id)));
        fs::create_dir_all(&path).unwrap();

        TempDir(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
