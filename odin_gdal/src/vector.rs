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

//! OGR polygon layer access. Geometries leave this module as `geo` types so that callers can
//! keep and share them without holding on to GDAL handles

use std::path::Path;
use gdal::vector::LayerAccess;
use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon, Rect, BoundingRect};

use crate::{open_vector, with_gis_order, CoordTransform, SpatialRef};
use crate::errors::{Result, OdinGdalError, misc_error, unsupported_geometry};

/// the polygons of the first layer of a vector dataset together with the layer SRS
pub struct PolygonLayer {
    pub srs: SpatialRef,
    pub shapes: Vec<MultiPolygon<f64>>,
}

/// read all features of the first layer in `path` as multi-polygons (in feature order).
/// Features without geometry are skipped, non-areal geometries are rejected
pub fn read_polygon_layer<P: AsRef<Path>> (path: P) -> Result<PolygonLayer> {
    let ds = open_vector( path.as_ref())?;
    if ds.layer_count() == 0 { return Err( misc_error("dataset has no layers")) }

    let mut layer = ds.layer(0)?;
    let srs = layer.spatial_ref().ok_or( OdinGdalError::NoSpatialReferenceSystem)?;
    let srs = with_gis_order(srs);

    let mut shapes: Vec<MultiPolygon<f64>> = Vec::new();
    for feature in layer.features() {
        if let Some(geom) = feature.geometry() {
            if let Some(mp) = to_multi_polygon( geom.to_geo()?)? {
                shapes.push(mp);
            }
        }
    }

    Ok( PolygonLayer { srs, shapes } )
}

/// normalize areal geometries into a MultiPolygon. Empty geometries map to None
pub fn to_multi_polygon (geom: Geometry<f64>) -> Result<Option<MultiPolygon<f64>>> {
    let mp = match geom {
        Geometry::Polygon(p) => MultiPolygon::new( vec![p]),
        Geometry::MultiPolygon(mp) => mp,
        Geometry::Rect(r) => MultiPolygon::new( vec![r.to_polygon()]),
        Geometry::Triangle(t) => MultiPolygon::new( vec![t.to_polygon()]),
        Geometry::GeometryCollection(gc) => {
            let mut polys: Vec<Polygon<f64>> = Vec::new();
            for g in gc {
                if let Some(mp) = to_multi_polygon(g)? {
                    polys.extend( mp.0.into_iter());
                }
            }
            MultiPolygon::new(polys)
        }
        Geometry::Point(_) => return Err( unsupported_geometry("Point")),
        Geometry::MultiPoint(_) => return Err( unsupported_geometry("MultiPoint")),
        Geometry::Line(_) => return Err( unsupported_geometry("Line")),
        Geometry::LineString(_) => return Err( unsupported_geometry("LineString")),
        Geometry::MultiLineString(_) => return Err( unsupported_geometry("MultiLineString")),
    };

    if mp.0.iter().all( |p| p.exterior().0.is_empty()) { Ok(None) } else { Ok(Some(mp)) }
}

/// envelope of all provided shapes, None if there are no (non-empty) shapes
pub fn shapes_bounding_rect (shapes: &[MultiPolygon<f64>]) -> Option<Rect<f64>> {
    shapes.iter()
        .filter_map( |mp| mp.bounding_rect())
        .reduce( |a,b| {
            Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) }
            )
        })
}

/* #region reprojection ******************************************************************************************/

/// reproject shapes from `src` into `tgt`. Both SpatialRefs have to use traditional GIS axis order.
/// If both refer to the same system the shapes are returned unchanged
pub fn transform_shapes (src: &SpatialRef, tgt: &SpatialRef, shapes: &[MultiPolygon<f64>]) -> Result<Vec<MultiPolygon<f64>>> {
    if src == tgt {
        return Ok( shapes.to_vec() )
    }

    let ct = CoordTransform::new( src, tgt)?;
    shapes.iter().map( |mp| transform_multi_polygon( &ct, mp)).collect()
}

pub fn transform_multi_polygon (ct: &CoordTransform, mp: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
    let polys = mp.0.iter().map( |p| transform_polygon( ct, p)).collect::<Result<Vec<Polygon<f64>>>>()?;
    Ok( MultiPolygon::new(polys) )
}

pub fn transform_polygon (ct: &CoordTransform, p: &Polygon<f64>) -> Result<Polygon<f64>> {
    let exterior = transform_line_string( ct, p.exterior())?;
    let interiors = p.interiors().iter().map( |ls| transform_line_string( ct, ls)).collect::<Result<Vec<LineString<f64>>>>()?;
    Ok( Polygon::new( exterior, interiors) )
}

// one transform_coords call per ring to keep the number of PROJ calls down
fn transform_line_string (ct: &CoordTransform, ls: &LineString<f64>) -> Result<LineString<f64>> {
    let mut xs: Vec<f64> = ls.coords().map( |c| c.x).collect();
    let mut ys: Vec<f64> = ls.coords().map( |c| c.y).collect();
    let mut zs: [f64;0] = [];

    ct.transform_coords( &mut xs, &mut ys, &mut zs)?;

    if xs.iter().chain( ys.iter()).any( |v| !v.is_finite()) {
        return Err( misc_error("coordinate transformation produced non-finite values"))
    }
    Ok( xs.into_iter().zip( ys.into_iter()).map( |(x,y)| Coord{x,y}).collect() )
}

/* #endregion reprojection */
