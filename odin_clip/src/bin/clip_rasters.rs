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
#![allow(unused)]

use std::{fs, path::PathBuf};
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_clip::{load_config, run_batch, BatchRequest, ClipConfig, ClipFailure, OdinClipError, Upload};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "clip GeoTIFF rasters with a shapefile boundary and store results in a zip archive")]
pub struct Args {
    /// all parts of the boundary shapefile (.shp, .shx, .dbf, .prj ..)
    #[arg(long, num_args=1.., required=true)]
    pub vector: Vec<PathBuf>,

    /// GeoTIFF files to clip
    #[arg(long, num_args=1.., required=true)]
    pub raster: Vec<PathBuf>,

    /// pathname of zip archive to create
    #[arg(short,long)]
    pub output: PathBuf,

    /// optional RON config file
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// optional pathname of JSON file to store failures in
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let config: ClipConfig = if let Some(path) = &args.config { load_config(path)? } else { ClipConfig::default() };
    let request = BatchRequest {
        vector_parts: args.vector.iter().map( Upload::from_path).collect::<odin_clip::Result<Vec<Upload>>>()?,
        rasters: args.raster.iter().map( Upload::from_path).collect::<odin_clip::Result<Vec<Upload>>>()?,
    };

    match run_batch( &request, &config) {
        Ok(batch) => {
            fs::write( &args.output, &batch.archive)?;
            for entry in &batch.entries {
                println!("clipped: {entry}");
            }
            report_failures( &args, &batch.failures)?;
            println!("{} of {} rasters stored in {:?}", batch.entries.len(), request.rasters.len(), args.output);
            Ok(())
        }
        Err(OdinClipError::NoClipResults(failures)) => {
            report_failures( &args, &failures)?;
            Err( anyhow!("none of the {} rasters could be clipped", request.rasters.len()))
        }
        Err(e) => Err(e.into())
    }
}

fn report_failures (args: &Args, failures: &[ClipFailure]) -> Result<()> {
    for f in failures {
        eprintln!("failed: {} ({:?}) {}", f.raster_name, f.kind, f.message);
    }
    if let Some(path) = &args.report {
        fs::write( path, serde_json::to_string_pretty(failures)?)?;
    }
    Ok(())
}
