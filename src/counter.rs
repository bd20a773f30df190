use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CounterFile {
    count: u64,
}

/// Export counter persisted across sessions as a small JSON file.
#[derive(Debug)]
pub struct SaveCounter {
    path: PathBuf,
    count: u64,
}

impl SaveCounter {
    /// A missing file starts the count at zero.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let count = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let file: CounterFile = serde_json::from_reader(reader)?;

            file.count
        } else {
            0
        };

        debug!("Save counter at {} ({})", count, path.display());

        Ok(Self { path, count })
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bumps the counter and writes it back, returning the new value.
    pub fn increment(&mut self) -> Result<u64> {
        self.count += 1;
        self.persist()?;

        Ok(self.count)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);

        serde_json::to_writer(&mut writer, &CounterFile { count: self.count })?;
        writer.flush()?;

        Ok(())
    }
}
