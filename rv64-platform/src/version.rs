// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Version strings for the boot banner, taken from git.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// The commit id `HEAD` of the repository containing `dir` points at.
pub fn head_commit(dir: &Path) -> Result<String> {
    let version_err = |reason: String| Error::Version {
        path: dir.to_path_buf(),
        reason,
    };

    let repo = gix::discover(dir).map_err(|err| version_err(err.to_string()))?;
    let id = repo
        .head_id()
        .map_err(|err| version_err(err.to_string()))?
        .detach();

    debug!("{} is at commit {id}", dir.display());
    Ok(id.to_string())
}
