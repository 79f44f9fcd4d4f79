//! Pretty-printed JSON output files

use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::WriteError;

const INDENT: &[u8] = b"    ";

/// Write `value` to `path` as indented JSON.
///
/// Missing parent directories are created. An existing file is truncated
/// and replaced, never merged. The write is not atomic: a crash midway can
/// leave a truncated file behind.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut buf = Vec::with_capacity(8 * 1024);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut ser)
        .map_err(|source| WriteError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    buf.push(b'\n');

    std::fs::write(path, &buf).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Wrote {} bytes to {}", buf.len(), path.display());
    Ok(())
}
