use std::env;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Absolute paths are kept, relative ones are taken from the project root.
pub fn resolve_path(path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        project_root().join(p)
    }
}

pub fn read_csv(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

pub fn dataframe_to_csv(df: &mut DataFrame, output_path: &Path) -> PolarsResult<()> {
    if let Some(parent) = output_path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = File::create(output_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;

    info!("Wrote {} rows to {}", df.height(), output_path.display());
    Ok(())
}
