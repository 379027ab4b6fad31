//! File fallback source: the static seed JSON shipped next to the app.

use super::{decode_body, FetchError, FetchResult, RecordSource};
use crate::model::processo::Processo;
use log::{error, info};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecordSource {
    path: PathBuf,
}

impl FileRecordSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FileRecordSource {
    fn fetch(&self) -> FetchResult<Vec<Processo>> {
        let result = std::fs::read_to_string(&self.path)
            .map_err(|err| FetchError::Io(format!("{}: {err}", self.path.display())))
            .and_then(|body| decode_body(&body));

        match &result {
            Ok(records) => info!(
                "event=fallback_fetch module=source status=ok kind=file records={}",
                records.len()
            ),
            Err(err) => error!(
                "event=fallback_fetch module=source status=error kind=file error={}",
                err
            ),
        }
        result
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
