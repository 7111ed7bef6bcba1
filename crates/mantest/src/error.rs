// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Errors from staging and running a test case.

use std::path::PathBuf;

use thiserror::Error;

/// Something went wrong outside the tool's own output. Fatal for the
/// test case it happened in.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot create work directory {}: {source}", path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot stage {}: {source}", path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot run `{}`: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Collect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot remove staging directory {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
