use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

const INDENT: &[u8] = b"    ";

/// Reads a whole JSON array from `path`.
pub fn read_array<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Malformed JSON array in {}", path.display()))
}

/// Writes `items` as an indented JSON array. Non-ASCII text is written as is.
///
/// The array goes to a sibling temporary file first and is renamed over
/// `path` once fully flushed.
pub fn write_array<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let tmp_path = temporary_sibling(path);

    let result = write_to(&tmp_path, items).and_then(|_| {
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                path.display()
            )
        })
    });

    if result.is_err() {
        _ = fs::remove_file(&tmp_path);
    }

    result
}

fn write_to<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
    items
        .serialize(&mut serializer)
        .with_context(|| format!("Failed to serialize into {}", path.display()))?;

    writer.write_all(b"\n")?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.json".to_string());

    path.with_file_name(format!(".{}.tmp", file_name))
}
