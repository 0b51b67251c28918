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

use geo::{MultiPolygon, Rect};
use tracing::{debug,info};

use odin_gdal::{has_extension, srs_from_wkt, SpatialRef};
use odin_gdal::errors::OdinGdalError;
use odin_gdal::vector::{read_polygon_layer, shapes_bounding_rect, transform_shapes};

use crate::{ClipConfig, Upload, Workspace};
use crate::errors::{Result, missing_primary_file, unreadable_vector_data, unexpected_failure};

/// the polygons that define which part of the rasters to keep, in the coordinate system they were
/// loaded with. Reprojection happens on demand for each target coordinate system
#[derive(Debug,Clone)]
pub struct BoundarySet {
    shapes: Vec<MultiPolygon<f64>>,
    srs_wkt: String,
    source: String,
}

impl BoundarySet {
    pub fn new (shapes: Vec<MultiPolygon<f64>>, srs_wkt: String, source: String) -> Self {
        BoundarySet { shapes, srs_wkt, source }
    }

    pub fn n_shapes (&self) -> usize { self.shapes.len() }
    pub fn srs_wkt (&self) -> &str { &self.srs_wkt }

    /// name of the primary vector file this set was loaded from
    pub fn source (&self) -> &str { &self.source }

    pub fn spatial_ref (&self) -> Result<SpatialRef> {
        srs_from_wkt( &self.srs_wkt).map_err( |e| unexpected_failure( &self.source, e))
    }

    /// the shapes in the coordinate system `tgt`, which has to use traditional GIS axis order
    pub fn shapes_in (&self, tgt: &SpatialRef) -> Result<Vec<MultiPolygon<f64>>> {
        let src = self.spatial_ref()?;
        transform_shapes( &src, tgt, &self.shapes)
            .map_err( |e| unexpected_failure( &self.source, format!("boundary reprojection failed: {e}")))
    }

    /// bounding envelope in our own coordinate system
    pub fn bounds (&self) -> Option<Rect<f64>> {
        shapes_bounding_rect( &self.shapes)
    }
}

/// the single upload among `parts` with the primary extension (case insensitive)
pub fn find_primary_file<'a> (parts: &'a [Upload], ext: &str) -> Result<&'a Upload> {
    let mut candidates = parts.iter().filter( |p| has_extension( &p.name, ext));

    match (candidates.next(), candidates.next()) {
        (Some(primary), None) => Ok(primary),
        (None, _) => Err( missing_primary_file( part_names(parts), format!("no .{ext} file"))),
        (Some(a), Some(b)) => Err( unreadable_vector_data( part_names(parts), format!("ambiguous primary files {} and {}", a.name, b.name)))
    }
}

fn part_names (parts: &[Upload]) -> String {
    if parts.is_empty() {
        "<no vector parts>".to_string()
    } else {
        parts.iter().map( |p| p.name.as_str()).collect::<Vec<&str>>().join(",")
    }
}

/// stage all vector parts in `ws` and read the polygons of the primary file
pub fn load_boundary (ws: &Workspace, parts: &[Upload], config: &ClipConfig) -> Result<BoundarySet> {
    let primary = find_primary_file( parts, &config.primary_extension)?;

    for part in parts.iter().filter( |p| !std::ptr::eq( *p, primary)) {
        ws.stage( &part.name, &part.data)?;
    }
    let path = ws.stage( &primary.name, &primary.data)?;

    let layer = read_polygon_layer( &path).map_err( |e| match e {
        OdinGdalError::NoSpatialReferenceSystem => unreadable_vector_data( &primary.name, "no coordinate system (missing .prj?)"),
        e => unreadable_vector_data( &primary.name, e)
    })?;

    if layer.shapes.is_empty() {
        return Err( unreadable_vector_data( &primary.name, "no polygon features"))
    }
    let srs_wkt = layer.srs.to_wkt().map_err( |e| unreadable_vector_data( &primary.name, e))?;

    let boundary = BoundarySet::new( layer.shapes, srs_wkt, primary.name.clone());
    info!("loaded {} boundary shapes from {}, bounds: {:?}", boundary.n_shapes(), boundary.source(), boundary.bounds());
    debug!("boundary SRS: {}", boundary.srs_wkt());

    Ok(boundary)
}
