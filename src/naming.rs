//! Local filename generation for remote items.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::report::ERROR_REPORT_FILENAME;

/// Make a Drive display name safe to use as a single path component.
///
/// Drive allows `/` in names, so path separators are replaced with `_`.
/// Names made only of dots (and the empty name) are replaced too, so that an
/// item can never resolve to its parent directory.
pub fn sanitize(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect();

    match sanitized.as_str() {
        "" => "_".to_string(),
        "." | ".." => "_".repeat(sanitized.len()),
        _ => sanitized,
    }
}

/// Build `dir/name[.extension]`.
pub fn destination_path(dir: &Path, name: &str, extension: Option<&str>) -> PathBuf {
    match extension {
        Some(ext) => dir.join(format!("{}.{}", name, ext)),
        None => dir.join(name),
    }
}

/// Return a path for `name` inside `dir` that does not exist yet.
///
/// When `dir/name[.extension]` is taken, a random `-<uuid>` suffix is added
/// right after the name so an export keeps its extension. The error report's
/// name always counts as taken.
pub fn resolve_collision(dir: &Path, name: &str, extension: Option<&str>) -> PathBuf {
    let candidate = destination_path(dir, name, extension);
    if !is_taken(&candidate) {
        return candidate;
    }

    let suffix = format!("-{}", Uuid::new_v4());
    tracing::warn!(
        "Path conflict: there was already a \"{}\" at {:?}, \"{}\" will be appended to the name.",
        name,
        dir,
        suffix
    );
    destination_path(dir, &format!("{}{}", name, suffix), extension)
}

fn is_taken(path: &Path) -> bool {
    path.exists()
        || path
            .file_name()
            .is_some_and(|name| name == ERROR_REPORT_FILENAME)
}

/// Sibling path that receives bytes while a transfer is in progress.
///
/// Normally `<path>.part`; if that name is taken the staging file gets a
/// random suffix as well.
pub fn staging_path(path: &Path) -> PathBuf {
    let with_suffix = |suffix: &str| {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };

    let staging = with_suffix(".part");
    if staging.exists() {
        with_suffix(&format!("-{}.part", Uuid::new_v4()))
    } else {
        staging
    }
}
