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

use std::path::Path;
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_gdal::{get_driver_name_from_filename, get_raster_info, open_raster, to_creation_options, with_gis_order, GTIFF_DRIVER};
use odin_gdal::mask::{mask_and_crop, MaskOptions};
use odin_gdal::vector::{read_polygon_layer, transform_shapes};

#[derive(Parser, Debug)]
#[command(version, about = "mask_crop - mask and crop a GeoTIFF with the polygons of a shapefile")]
struct Args {
    /// include all pixels touched by polygons, not just the ones with covered centers
    #[arg(long)]
    all_touched: bool,

    /// GeoTIFF create options (e.g. COMPRESS=DEFLATE)
    #[arg(long)]
    co: Vec<String>,

    /// path of the shapefile (*.shp) with the boundary polygons
    shp_path: String,

    /// input GeoTIFF
    src_path: String,

    /// output GeoTIFF
    tgt_path: String,
}

fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();
    let args = Args::parse();
    if get_driver_name_from_filename( &args.tgt_path.to_lowercase()) != Some(GTIFF_DRIVER) {
        return Err( anyhow!("output has to be a GeoTIFF (*.tif): {}", args.tgt_path))
    }

    let layer = read_polygon_layer( &args.shp_path)?;
    let src_ds = open_raster( Path::new( &args.src_path))?;
    let info = get_raster_info( &src_ds)?;
    println!("source: {} x {} pixels, extent {:?}", info.cols, info.rows, info.extent());

    let raster_srs = with_gis_order( src_ds.spatial_ref()?);
    let shapes = transform_shapes( &layer.srs, &raster_srs, &layer.shapes)?;

    let opts = MaskOptions { all_touched: args.all_touched };
    let masked = mask_and_crop( &src_ds, &shapes, &opts)?;
    let co = to_creation_options( &args.co)?;
    let bytes = masked.encode_gtiff( "mask_crop.tif", co.as_ref())?;
    std::fs::write( &args.tgt_path, &bytes)?;

    println!("cropped to {:?} ({} covered pixels per band), {} bytes written to {}",
             masked.window, masked.n_covered(), bytes.len(), args.tgt_path);
    Ok(())
}
