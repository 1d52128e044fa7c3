//! Capability-based filesystem helpers shared by the export crates.
//!
//! Paths are UTF-8 (`camino`) and every access goes through an ambient
//! `cap-std` directory handle opened on the path's parent.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Read};

/// Open the directory containing `path` and return it with the final path
/// component.
pub fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("path {path} has no file name")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Read a whole UTF-8 text file, such as an SQL script.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Whether `path` exists and is a regular file.
///
/// A missing path yields `Ok(false)`; other inspection failures propagate.
pub fn is_file(path: &Utf8Path) -> io::Result<bool> {
    metadata_matches(path, |meta| meta.is_file())
}

/// Whether `path` exists and is a directory.
pub fn is_dir(path: &Utf8Path) -> io::Result<bool> {
    if path.as_str().is_empty() || path == Utf8Path::new(".") || path == Utf8Path::new("/") {
        return Ok(true);
    }
    metadata_matches(path, |meta| meta.is_dir())
}

fn metadata_matches(
    path: &Utf8Path,
    predicate: impl FnOnce(&cap_std::fs::Metadata) -> bool,
) -> io::Result<bool> {
    let (dir, name) = match open_parent(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(predicate(&meta)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Create `path` and any missing ancestors.
///
/// The nearest existing ancestor is opened as the ambient directory and the
/// remainder is created beneath it.
pub fn create_dir_all(path: &Utf8Path) -> io::Result<()> {
    for ancestor in path.ancestors() {
        let base = if ancestor.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            ancestor
        };
        let dir = match fs_utf8::Dir::open_ambient_dir(base, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        let rest = path
            .strip_prefix(ancestor)
            .map_err(|_| io::Error::other(format!("{ancestor} is not a prefix of {path}")))?;
        if rest.as_str().is_empty() {
            return Ok(());
        }
        return dir.create_dir_all(rest);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no existing ancestor of {path}"),
    ))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => create_dir_all(parent),
        None => Ok(()),
    }
}

/// Regular files directly inside `dir` whose extension is `extension`,
/// sorted by file name.
///
/// A missing directory yields an empty list.
pub fn files_with_extension(dir: &Utf8Path, extension: &str) -> io::Result<Vec<Utf8PathBuf>> {
    let handle = match fs_utf8::Dir::open_ambient_dir(dir, ambient_authority()) {
        Ok(handle) => handle,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut names = Vec::new();
    for entry in handle.entries()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name()?;
        if Utf8Path::new(&name).extension() == Some(extension) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}
