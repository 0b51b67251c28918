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

use tracing::debug;

use odin_gdal::{open_raster, to_creation_options, with_gis_order};
use odin_gdal::errors::OdinGdalError;
use odin_gdal::mask::{mask_and_crop, MaskOptions};

use crate::{archive_entry_name, BoundarySet, ClipConfig, ClipResult, Upload, Workspace};
use crate::errors::{Result, encoding_error, no_overlap, raster_unreadable, unexpected_failure};

/// clip a single raster upload with `boundary`.
///
/// The boundary is reprojected into the coordinate system of the raster, the raster is cropped to the
/// pixel envelope of the boundary and all pixels outside of the boundary polygons are set to nodata.
/// The result is a GeoTIFF with the band count, data type, coordinate system and nodata value of
/// the source
pub fn clip_raster (ws: &Workspace, raster: &Upload, boundary: &BoundarySet, config: &ClipConfig) -> Result<ClipResult> {
    let name = raster.name.as_str();
    let out_name = archive_entry_name( &config.output_prefix, name)?;

    let path = ws.stage( name, &raster.data)?;
    let ds = open_raster( &path).map_err( |e| raster_unreadable( name, e))?;

    let srs = ds.spatial_ref().map_err( |_| raster_unreadable( name, "no coordinate system"))?;
    let srs = with_gis_order(srs);
    let shapes = boundary.shapes_in( &srs).map_err( |e| unexpected_failure( name, e))?;

    let opts = MaskOptions { all_touched: config.all_touched };
    let masked = mask_and_crop( &ds, &shapes, &opts).map_err( |e| match e {
        OdinGdalError::NoOverlap => no_overlap( name, "raster extent does not intersect boundary"),
        e @ (OdinGdalError::NoRasterBands | OdinGdalError::NotHomogenous |
             OdinGdalError::NoGeoTransform | OdinGdalError::RotatedGeoTransform) => raster_unreadable( name, e),
        e => unexpected_failure( name, e)
    })?;
    debug!("{}: window {:?} with {} covered pixels", name, masked.window, masked.n_covered());

    let co = to_creation_options( &config.create_options).map_err( |e| encoding_error( name, e))?;
    let data = masked.encode_gtiff( &out_name, co.as_ref()).map_err( |e| encoding_error( name, e))?;

    Ok( ClipResult { name: out_name, data } )
}
