use anyhow::{Context, Result};
use log::error;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::{self, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
};

use crate::models::{ScoreRecord, StoredUser};

pub const USERS_FILE: &str = "users.json";
pub const SCORES_FILE: &str = "student_scores.json";

/// A JSON array of records kept in a single file and rewritten whole on
/// every change.
#[derive(Clone, Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    records: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> JsonFile<T> {
        JsonFile {
            path: path.into(),
            records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record. A missing file is an empty collection; so is a
    /// file that doesn't parse, after it has been copied aside.
    pub fn read(&self) -> Result<Vec<T>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("couldn't read {}", self.path.display()))
            }
        };

        match serde_json::from_str(&contents) {
            Ok(records) => Ok(records),
            Err(err) => {
                let corrupt = self.sibling("corrupt");
                error!(
                    "{} is not valid JSON ({}), treating it as empty; contents copied to {}",
                    self.path.display(),
                    err,
                    corrupt.display(),
                );
                fs::copy(&self.path, &corrupt)
                    .with_context(|| format!("couldn't preserve {}", self.path.display()))?;
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the file with `records`. Readers see either the old or the
    /// new contents, never a partial write.
    pub fn write(&self, records: &[T]) -> Result<()> {
        let tmp = self.sibling("tmp");
        let json = serde_json::to_vec_pretty(records)?;

        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("couldn't create {}", tmp.display()))?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .with_context(|| format!("couldn't replace {}", self.path.display()))?;

        Ok(())
    }

    pub fn create_if_missing(&self) -> Result<()> {
        if !self.path.exists() {
            self.write(&[])?;
        }

        Ok(())
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

/// Both collections of the service. Callers serialize access to it, the
/// files themselves are not locked.
#[derive(Clone, Debug)]
pub struct Store {
    pub users: JsonFile<StoredUser>,
    pub scores: JsonFile<ScoreRecord>,
}

impl Store {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Store> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)
            .with_context(|| format!("couldn't create data directory {}", data_dir.display()))?;

        let store = Store {
            users: JsonFile::new(data_dir.join(USERS_FILE)),
            scores: JsonFile::new(data_dir.join(SCORES_FILE)),
        };

        store.users.create_if_missing()?;
        store.scores.create_if_missing()?;

        Ok(store)
    }
}
