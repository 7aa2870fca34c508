use std::fs;

use camino::Utf8Path;

use crate::error::GfetchError;

pub fn ensure_dir(dir: &Utf8Path) -> Result<(), GfetchError> {
    match fs::create_dir_all(dir.as_std_path()) {
        Ok(()) => Ok(()),
        Err(_) if dir.as_std_path().is_dir() => Ok(()),
        Err(err) => Err(GfetchError::Filesystem(format!("create {dir}: {err}"))),
    }
}
