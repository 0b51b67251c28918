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

use std::{collections::HashSet, io::{Cursor,Write}};
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter};

use crate::ClipResult;
use crate::workspace::upload_file_name;
use crate::errors::{Result, encoding_error};

/// zip archive name of the clip result for `raster_name`
pub fn archive_entry_name (prefix: &str, raster_name: &str) -> Result<String> {
    Ok( format!("{}{}", prefix, upload_file_name(raster_name)?) )
}

/// package clip results as flat, deflated zip entries in the given order.
/// Entries use a fixed timestamp and permissions so that the same results always produce the same archive
pub fn package (results: &[ClipResult]) -> Result<Vec<u8>> {
    let mut names: HashSet<&str> = HashSet::new();
    let mut zip = ZipWriter::new( Cursor::new( Vec::new()));

    for result in results {
        let name = result.name.as_str();
        if !names.insert( name) {
            return Err( encoding_error( name, "duplicate archive entry"))
        }
        zip.start_file( name, entry_options()).map_err( |e| encoding_error( name, e))?;
        zip.write_all( &result.data).map_err( |e| encoding_error( name, e))?;
    }

    let cursor = zip.finish().map_err( |e| encoding_error( "archive", e))?;
    Ok( cursor.into_inner() )
}

fn entry_options () -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method( CompressionMethod::Deflated)
        .last_modified_time( DateTime::default()) // 1980-01-01 00:00:00
        .unix_permissions( 0o644)
}
