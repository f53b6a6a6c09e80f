use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::structures::Error;

/// Replaces the file at `path` with `contents`, either fully or not at all.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), Error> {
  let mut temporary = path.as_os_str().to_owned();
  temporary.push(".tmp");
  let temporary = std::path::PathBuf::from(temporary);

  let result = (|| {
    if let Some(parent) = path.parent() {
      std::fs::DirBuilder::new().recursive(true).create(parent)?;
    }
    let mut file = OpenOptions::new().write(true).create(true).truncate(true).open(&temporary)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(&temporary, path)
  })();

  result.map_err(|e| {
    let _ = std::fs::remove_file(&temporary);
    Error::persistence(path, e)
  })
}
