/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{fs, path::{Path,PathBuf}};
use tempfile::TempDir;
use tracing::debug;

use crate::errors::{Result, unexpected_failure};

/// a private scratch directory for the uploads of one batch. The directory and everything staged
/// in it is removed when the Workspace is dropped
pub struct Workspace {
    dir: TempDir
}

impl Workspace {
    pub fn new () -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("odin_clip").tempdir()
            .map_err( |e| unexpected_failure( "workspace", e))?;
        debug!("created workspace {:?}", dir.path());
        Ok( Workspace { dir } )
    }

    pub fn path (&self) -> &Path {
        self.dir.path()
    }

    /// write `bytes` into the workspace under the file name of `name` and return the staged path
    pub fn stage (&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join( upload_file_name(name)?);
        fs::write( &path, bytes).map_err( |e| unexpected_failure( name, e))?;
        Ok(path)
    }
}

impl Drop for Workspace {
    fn drop (&mut self) {
        debug!("removing workspace {:?}", self.dir.path());
    }
}

/// the final path component of an upload name. Names without a usable file name are rejected so
/// that staged files always end up inside of the workspace
pub fn upload_file_name (name: &str) -> Result<&str> {
    let fname = name.rsplit( |c| c == '/' || c == '\\').next().unwrap_or("");
    if fname.is_empty() || fname == "." || fname == ".." {
        Err( unexpected_failure( name, "not a valid upload file name"))
    } else {
        Ok(fname)
    }
}
