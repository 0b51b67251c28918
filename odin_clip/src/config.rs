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

use std::{fs, path::Path};
use serde::{Deserialize,Serialize};

use crate::errors::Result;

/// configuration of clip batches. All fields are optional in config files
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// extension (without '.') of the primary file among the vector parts
    pub primary_extension: String,

    /// prepended to raster names to obtain archive entry names
    pub output_prefix: String,

    /// keep all pixels touched by a boundary polygon instead of only the ones with covered centers
    pub all_touched: bool,

    /// GTiff creation options such as "COMPRESS=DEFLATE"
    pub create_options: Vec<String>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        ClipConfig {
            primary_extension: "shp".to_string(),
            output_prefix: "clipped_".to_string(),
            all_touched: false,
            create_options: Vec::new(),
        }
    }
}

pub fn load_config<P: AsRef<Path>> (path: P) -> Result<ClipConfig> {
    let data = fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

pub fn parse_config (s: &str) -> Result<ClipConfig> {
    Ok( ron::de::from_str(s)? )
}
