//! Route files on disk.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::RouteFile;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no route files found")]
    Empty,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SourceError + '_ {
    move |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read route files in the given order. Directories contribute every `.txt`
/// file below them, sorted so that `act-2.txt` comes before `act-10.txt`.
///
/// # Errors
/// Fails on unreadable paths or when nothing was found.
pub fn read_route_files(paths: &[PathBuf]) -> Result<Vec<RouteFile>, SourceError> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut in_dir = Vec::new();
            collect_route_files_recursive(path, &mut in_dir)?;
            in_dir.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
            found.extend(in_dir);
        } else {
            found.push(path.clone());
        }
    }
    if found.is_empty() {
        return Err(SourceError::Empty);
    }
    found
        .into_iter()
        .map(|path| {
            let contents = fs::read_to_string(&path).map_err(io_error(&path))?;
            Ok(RouteFile::new(path.display().to_string(), contents))
        })
        .collect()
}

fn collect_route_files_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    for entry in fs::read_dir(dir).map_err(io_error(dir))?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_route_files_recursive(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            out.push(path);
        }
    }
    Ok(())
}

/// Compare names treating digit runs as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let a_len = a.find(|c: char| !c.is_ascii_digit()).unwrap_or(a.len());
                let b_len = b.find(|c: char| !c.is_ascii_digit()).unwrap_or(b.len());
                let a_num = a[..a_len].trim_start_matches('0');
                let b_num = b[..b_len].trim_start_matches('0');
                let ord = a_num.len().cmp(&b_num.len()).then_with(|| a_num.cmp(b_num));
                if ord != Ordering::Equal {
                    return ord;
                }
                a = &a[a_len..];
                b = &b[b_len..];
            },
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a = &a[x.len_utf8()..];
                b = &b[y.len_utf8()..];
            },
        }
    }
}
