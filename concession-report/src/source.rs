//! Table loading from a directory of JSON files.
use concession_core::{TableSource, Tables};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads each table from `<dir>/<table>.json`, a JSON array of rows.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T, SourceError> {
        let path = self.dir.join(format!("{name}.json"));
        let raw = fs::read_to_string(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = serde_json::from_str(&raw).map_err(|source| SourceError::Parse {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded {}", path.display());
        Ok(parsed)
    }

    fn read_optional<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, SourceError> {
        match self.read(name) {
            Err(SourceError::Io { source, path }) if source.kind() == ErrorKind::NotFound => {
                log::info!("{} not present, skipping", path.display());
                Ok(T::default())
            }
            other => other,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableSource for JsonDirSource {
    type Error = SourceError;

    fn load_tables(&self) -> Result<Tables, Self::Error> {
        Ok(Tables {
            concessions: self.read("properties")?,
            vegetation: self.read("vegetation")?,
            evapotranspiration: self.read("evapotranspiration")?,
            deforestation: self.read("deforestation")?,
            water: self.read("water")?,
            fires: self.read("fires")?,
            carbon: self.read_optional("carbon")?,
            weather: self.read_optional("weather")?,
        })
    }
}
