//! JSON loading for ingestion output.

use crate::effects::EffectRecord;
use crate::units::GameEntityLine;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed data in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load entity lines exported by the ingestion stage.
pub fn load_lines(path: &Path) -> Result<Vec<GameEntityLine>, LoadError> {
    let lines: Vec<GameEntityLine> = load_json(path)?;
    log::info!("Loaded {} entity lines from {:?}", lines.len(), path);
    Ok(lines)
}

/// Load one effect table (a tech or civ bonus).
pub fn load_effects(path: &Path) -> Result<Vec<EffectRecord>, LoadError> {
    let effects: Vec<EffectRecord> = load_json(path)?;
    log::debug!("Loaded {} effect records from {:?}", effects.len(), path);
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_effects() {
        let mut file = NamedTempFile::new().expect("TempFile");
        write!(
            file,
            r#"[{{"command_type": 4, "unit_id": 75, "class_id": -1, "attribute_id": 109, "amount": 0.5}}]"#
        )
        .expect("Write");

        let effects = load_effects(file.path()).unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].attribute_id, 109);
        assert_eq!(effects[0].target_unit(), Some(75));
    }

    #[test]
    fn test_load_lines_missing_file() {
        let err = load_lines(Path::new("/nonexistent/lines.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_lines_malformed() {
        let mut file = NamedTempFile::new().expect("TempFile");
        write!(file, "{{ not json").expect("Write");
        let err = load_lines(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }
}
