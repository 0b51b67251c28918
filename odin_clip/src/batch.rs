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

use std::{collections::HashSet, fs, path::Path};
use serde::{Deserialize,Serialize};
use tracing::{info,warn};

use crate::{clip_raster, load_boundary, package, archive_entry_name, ClipConfig, Workspace};
use crate::errors::{Result, ErrorKind, OdinClipError, unexpected_failure};

/// a named uploaded file
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Upload {
    pub name: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new (name: impl ToString, data: Vec<u8>) -> Self {
        Upload { name: name.to_string(), data }
    }

    /// read a file into an Upload that is named after the file
    pub fn from_path<P: AsRef<Path>> (path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.file_name().and_then( |s| s.to_str())
            .ok_or_else( || unexpected_failure( path.display(), "not a valid file name"))?;
        let data = fs::read(path)?;
        Ok( Upload { name: name.to_string(), data } )
    }
}

/// the boundary parts and rasters of one clip request
#[derive(Debug,Clone,Default)]
pub struct BatchRequest {
    pub vector_parts: Vec<Upload>,
    pub rasters: Vec<Upload>,
}

/// an encoded (GeoTIFF) clip result under its archive entry name
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct ClipResult {
    pub name: String,
    pub data: Vec<u8>,
}

/// why a raster of a batch was skipped
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct ClipFailure {
    pub raster_name: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ClipFailure {
    pub fn new (raster_name: &str, e: &OdinClipError) -> Self {
        ClipFailure { raster_name: raster_name.to_string(), kind: e.kind(), message: e.to_string() }
    }
}

#[derive(Debug,Clone,Default)]
pub struct BatchOutcome {
    /// successfully clipped rasters in upload order
    pub results: Vec<ClipResult>,
    pub failures: Vec<ClipFailure>,
}

/// what a caller receives for a batch with at least one clipped raster
#[derive(Debug,Clone)]
pub struct BatchArchive {
    /// zip file content
    pub archive: Vec<u8>,
    pub entries: Vec<String>,
    pub failures: Vec<ClipFailure>,
}

/// clip all rasters of `request` with the boundary of the request.
///
/// Boundary errors fail the whole batch before any raster is processed. Raster errors are recorded
/// as `ClipFailure`s and do not affect the other rasters of the batch
pub fn clip_batch (request: &BatchRequest, config: &ClipConfig) -> Result<BatchOutcome> {
    info!("clipping batch of {} rasters with {} vector parts", request.rasters.len(), request.vector_parts.len());

    let ws = Workspace::new()?;
    let boundary = load_boundary( &ws, &request.vector_parts, config)?;

    let mut outcome = BatchOutcome::default();
    let mut entry_names: HashSet<String> = HashSet::new();

    for raster in &request.rasters {
        // names are only taken by rasters that made it into the results
        let res = archive_entry_name( &config.output_prefix, &raster.name).and_then( |entry_name| {
            if entry_names.contains( &entry_name) {
                Err( unexpected_failure( &raster.name, "duplicate raster name in batch"))
            } else {
                clip_raster( &ws, raster, &boundary, config)
            }
        });

        match res {
            Ok(result) => {
                info!("clipped {} -> {} ({} bytes)", raster.name, result.name, result.data.len());
                entry_names.insert( result.name.clone());
                outcome.results.push( result);
            }
            Err(e) => {
                warn!("skipping raster {}: {}", raster.name, e);
                outcome.failures.push( ClipFailure::new( &raster.name, &e));
            }
        }
    }

    info!("batch done: {} clipped, {} failed", outcome.results.len(), outcome.failures.len());
    Ok(outcome)
}

/// clip all rasters of `request` and package the results into a zip archive.
/// Fails with `NoClipResults` if not a single raster could be clipped
pub fn run_batch (request: &BatchRequest, config: &ClipConfig) -> Result<BatchArchive> {
    let BatchOutcome { results, failures } = clip_batch( request, config)?;

    if results.is_empty() {
        return Err( OdinClipError::NoClipResults(failures))
    }

    let archive = package( &results)?;
    let entries = results.into_iter().map( |r| r.name).collect();

    Ok( BatchArchive { archive, entries, failures } )
}
