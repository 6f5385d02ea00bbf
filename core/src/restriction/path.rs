//! Filesystem path restrictions.

use std::fmt;
use std::fs::{self, Metadata};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ValueRestriction;
use crate::error::RestrictionViolation;

/// Kind of filesystem entry a path must refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    File,
    Directory,
    /// Any kind of entry.
    #[default]
    Either,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Either => "file or directory",
        })
    }
}

/// Checks that each value names a path with the requested properties.
///
/// A path that does not exist passes unless `must_exist` is set; the other
/// checks only apply to existing paths.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{PathKind, PathRestriction, ValueRestriction};
///
/// let dir = std::env::temp_dir();
/// let dir = dir.to_str().unwrap();
///
/// let must_be_dir = PathRestriction::new(PathKind::Directory).must_exist();
/// assert!(must_be_dir.check_value("output", dir).is_ok());
///
/// let must_be_file = PathRestriction::new(PathKind::File);
/// assert!(must_be_file.check_value("input", dir).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRestriction {
    pub must_exist: bool,
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
    pub kind: PathKind,
}

impl PathRestriction {
    pub fn new(kind: PathKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn must_exist(mut self) -> Self {
        self.must_exist = true;
        self
    }

    pub fn readable(mut self) -> Self {
        self.readable = true;
        self
    }

    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }
}

impl ValueRestriction for PathRestriction {
    fn check_value(&self, title: &str, value: &str) -> Result<(), RestrictionViolation> {
        let path = Path::new(value);
        let violation = |make: fn(String, String) -> RestrictionViolation| {
            Err(make(title.to_string(), value.to_string()))
        };

        let Ok(metadata) = fs::metadata(path) else {
            if self.must_exist {
                return violation(|title, path| RestrictionViolation::PathMissing { title, path });
            }
            return Ok(());
        };

        let kind_ok = match self.kind {
            PathKind::File => metadata.is_file(),
            PathKind::Directory => metadata.is_dir(),
            PathKind::Either => true,
        };
        if !kind_ok {
            return Err(RestrictionViolation::PathKindMismatch {
                title: title.to_string(),
                path: value.to_string(),
                expected: self.kind,
            });
        }

        if self.readable && !is_readable(path, &metadata) {
            return violation(|title, path| RestrictionViolation::PathNotReadable { title, path });
        }
        if self.writable && !is_writable(path, &metadata) {
            return violation(|title, path| RestrictionViolation::PathNotWritable { title, path });
        }
        if self.executable && !is_executable(path, &metadata) {
            return violation(|title, path| RestrictionViolation::PathNotExecutable { title, path });
        }
        Ok(())
    }
}

/// Asks the kernel whether the effective user may access `path` with `mode`.
#[cfg(unix)]
fn can_access(path: &Path, mode: libc::c_int) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `path` is a NUL-terminated string that outlives the call.
    unsafe { libc::faccessat(libc::AT_FDCWD, path.as_ptr(), mode, libc::AT_EACCESS) == 0 }
}

#[cfg(unix)]
fn is_readable(path: &Path, _metadata: &Metadata) -> bool {
    can_access(path, libc::R_OK)
}

#[cfg(not(unix))]
fn is_readable(path: &Path, metadata: &Metadata) -> bool {
    if metadata.is_dir() {
        fs::read_dir(path).is_ok()
    } else {
        fs::File::open(path).is_ok()
    }
}

#[cfg(unix)]
fn is_writable(path: &Path, _metadata: &Metadata) -> bool {
    can_access(path, libc::W_OK)
}

#[cfg(not(unix))]
fn is_writable(_path: &Path, metadata: &Metadata) -> bool {
    !metadata.permissions().readonly()
}

#[cfg(unix)]
fn is_executable(path: &Path, _metadata: &Metadata) -> bool {
    can_access(path, libc::X_OK)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path, _metadata: &Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_passes_unless_required() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let missing = missing.to_str().unwrap();

        assert!(
            PathRestriction::new(PathKind::File)
                .check_value("input", missing)
                .is_ok()
        );
        assert_eq!(
            PathRestriction::new(PathKind::File)
                .must_exist()
                .check_value("input", missing),
            Err(RestrictionViolation::PathMissing {
                title: "input".into(),
                path: missing.into()
            })
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.txt");
        std::fs::write(&file, "x").unwrap();

        let err = PathRestriction::new(PathKind::Directory)
            .check_value("out", file.to_str().unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            RestrictionViolation::PathKindMismatch {
                expected: PathKind::Directory,
                ..
            }
        ));
        assert!(
            PathRestriction::new(PathKind::Either)
                .check_value("out", file.to_str().unwrap())
                .is_ok()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_follow_actual_access() {
        use std::fs::{File, OpenOptions, Permissions};
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("script.sh");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();
        let value = file.to_str().unwrap();

        std::fs::set_permissions(&file, Permissions::from_mode(0o644)).unwrap();
        let restriction = PathRestriction::new(PathKind::File).readable().writable();
        assert!(restriction.check_value("script", value).is_ok());
        assert!(matches!(
            PathRestriction::new(PathKind::File)
                .executable()
                .check_value("script", value),
            Err(RestrictionViolation::PathNotExecutable { .. })
        ));

        std::fs::set_permissions(&file, Permissions::from_mode(0o555)).unwrap();
        assert!(
            PathRestriction::new(PathKind::File)
                .executable()
                .check_value("script", value)
                .is_ok()
        );
        let can_write = OpenOptions::new().write(true).open(&file).is_ok();
        let writable = PathRestriction::new(PathKind::File)
            .writable()
            .check_value("script", value);
        assert_eq!(writable.is_ok(), can_write, "{writable:?}");

        std::fs::set_permissions(&file, Permissions::from_mode(0o000)).unwrap();
        let can_open = File::open(&file).is_ok();
        let readable = PathRestriction::new(PathKind::File)
            .readable()
            .check_value("script", value);
        assert_eq!(readable.is_ok(), can_open, "{readable:?}");
        if !can_open {
            assert!(matches!(
                readable,
                Err(RestrictionViolation::PathNotReadable { .. })
            ));
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PathKind::File.to_string(), "file");
        assert_eq!(PathKind::Either.to_string(), "file or directory");
    }
}
