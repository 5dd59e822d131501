// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Writing generated files to disk.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::{NamedTempFile, TempPath};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    GeneratedFiles,
};

pub const DTS_FILE_NAME: &str = "rv64_platform.dts";
pub const INFO_FILE_NAME: &str = "info.h";

/// Write both generated files into `out_dir`, creating it if needed.
///
/// Both files are staged as temporary files in `out_dir` before either
/// destination is touched. Existing destinations are moved aside while the
/// staged files are renamed into place; if any step fails, every destination
/// already replaced is restored, so the directory holds either both new files
/// or neither.
pub fn write_outputs(out_dir: &Path, files: &GeneratedFiles) -> Result<()> {
    fs::create_dir_all(out_dir).map_err(|err| Error::io(out_dir, err))?;

    let staged = [
        (DTS_FILE_NAME, stage(out_dir, &files.dts)?),
        (INFO_FILE_NAME, stage(out_dir, &files.info_header)?),
    ];

    let mut committed = Vec::with_capacity(staged.len());
    for (name, file) in staged {
        match commit(out_dir, file, out_dir.join(name)) {
            Ok(done) => committed.push(done),
            Err(err) => {
                for done in committed.into_iter().rev() {
                    done.roll_back();
                }
                return Err(err);
            }
        }
    }

    for done in committed {
        info!("wrote {}", done.dest.display());
    }
    Ok(())
}

fn stage(out_dir: &Path, contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new_in(out_dir).map_err(|err| Error::io(out_dir, err))?;
    file.write_all(contents.as_bytes())
        .map_err(|err| Error::io(file.path(), err))?;
    Ok(file)
}

/// A staged file renamed onto its destination. The previous destination, if
/// any, is held in `backup` and deleted when this is dropped.
struct Committed {
    dest: PathBuf,
    backup: Option<TempPath>,
}

impl Committed {
    fn roll_back(self) {
        match self.backup {
            Some(backup) => restore(backup, &self.dest),
            None => {
                if let Err(err) = fs::remove_file(&self.dest) {
                    warn!("could not remove {}: {err}", self.dest.display());
                }
            }
        }
    }
}

fn restore(backup: TempPath, dest: &Path) {
    if let Err(err) = backup.persist(dest) {
        warn!(
            "could not restore {} from {}: {}",
            dest.display(),
            err.path.display(),
            err.error
        );
    }
}

fn commit(out_dir: &Path, staged: NamedTempFile, dest: PathBuf) -> Result<Committed> {
    let backup = NamedTempFile::new_in(out_dir)
        .map_err(|err| Error::io(out_dir, err))?
        .into_temp_path();
    let backup = match fs::rename(&dest, &backup) {
        Ok(()) => Some(backup),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => return Err(Error::io(&dest, err)),
    };

    if let Err(err) = staged.persist(&dest) {
        if let Some(backup) = backup {
            restore(backup, &dest);
        }
        return Err(Error::io(&dest, err.error));
    }

    Ok(Committed { dest, backup })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("bootrom");
        let files = GeneratedFiles {
            dts: "/dts-v1/;\n".to_string(),
            info_header: "const char info[] = {};\n".to_string(),
        };

        write_outputs(&out_dir, &files).unwrap();

        let dts = fs::read_to_string(out_dir.join(DTS_FILE_NAME)).unwrap();
        let info = fs::read_to_string(out_dir.join(INFO_FILE_NAME)).unwrap();
        assert_eq!(dts, files.dts);
        assert_eq!(info, files.info_header);
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 2);
    }

    #[test]
    fn overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DTS_FILE_NAME), "stale").unwrap();
        fs::write(dir.path().join(INFO_FILE_NAME), "stale").unwrap();
        let files = GeneratedFiles {
            dts: "fresh".to_string(),
            info_header: "fresh info".to_string(),
        };

        write_outputs(dir.path(), &files).unwrap();

        let dts = fs::read_to_string(dir.path().join(DTS_FILE_NAME)).unwrap();
        let info = fs::read_to_string(dir.path().join(INFO_FILE_NAME)).unwrap();
        assert_eq!(dts, "fresh");
        assert_eq!(info, "fresh info");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn failed_second_file_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DTS_FILE_NAME), "old dts").unwrap();
        let blocker = dir.path().join(INFO_FILE_NAME);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "").unwrap();
        let files = GeneratedFiles {
            dts: "new dts".to_string(),
            info_header: "new info".to_string(),
        };

        assert!(matches!(
            write_outputs(dir.path(), &files),
            Err(Error::Io { .. })
        ));

        let dts = fs::read_to_string(dir.path().join(DTS_FILE_NAME)).unwrap();
        assert_eq!(dts, "old dts");
        assert!(blocker.join("keep").is_file());
        // no staged or backup files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn failed_second_file_removes_new_first() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join(INFO_FILE_NAME);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "").unwrap();
        let files = GeneratedFiles {
            dts: "new dts".to_string(),
            info_header: "new info".to_string(),
        };

        assert!(write_outputs(dir.path(), &files).is_err());

        assert!(!dir.path().join(DTS_FILE_NAME).exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
