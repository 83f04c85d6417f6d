//! Каталог с JSON-файлами: `<dir>/<key>.json` на каждую коллекцию.
//! Даты сериализуются в ISO-8601.

use crate::{
    error::Result,
    traits::{CollectionKey, RecordStore},
};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Создаёт каталог, если его нет.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: CollectionKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl RecordStore for JsonDirStore {
    fn load<T: DeserializeOwned>(&self, key: CollectionKey) -> Result<Vec<T>> {
        let path = self.path(key);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let records: Vec<T> = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), count = records.len(), "loaded collection");
        Ok(records)
    }

    fn save<T: Serialize>(&self, key: CollectionKey, records: &[T]) -> Result<()> {
        let path = self.path(key);
        // пишем во временный файл и переименовываем, чтобы не оставить половину JSON
        let tmp = path.with_extension("json.tmp");
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut w, records)?;
            w.flush()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), count = records.len(), "saved collection");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        for key in CollectionKey::ALL {
            match fs::remove_file(self.path(key)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
