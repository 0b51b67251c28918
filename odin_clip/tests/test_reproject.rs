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

mod common;

use anyhow::Result;
use odin_gdal::{srs_epsg, with_gis_order};
use odin_clip::{clip_batch, ClipConfig};
use common::*;

// run with "cargo test --test test_reproject -- --nocapture"

const WGS84_A: f64 = 6378137.0;
const WGS84_E2: f64 = 0.0066943799901413165;

// boundary in EPSG:4326 (lon/lat degrees)
const BOUNDARY: &str = "POLYGON ((0.2 0.2,0.8 0.2,0.8 0.8,0.2 0.8,0.2 0.2))";
const LON: [f64;2] = [0.2, 0.8];
const LAT: [f64;2] = [0.2, 0.8];

/// EPSG:3857 (spherical mercator)
fn pseudo_mercator (lon: f64, lat: f64) -> (f64,f64) {
    let phi = lat.to_radians();
    (WGS84_A * lon.to_radians(), WGS84_A * (std::f64::consts::FRAC_PI_4 + phi/2.0).tan().ln())
}

/// EPSG:3395 (ellipsoidal mercator)
fn world_mercator (lon: f64, lat: f64) -> (f64,f64) {
    let phi = lat.to_radians();
    let e = WGS84_E2.sqrt();
    let es = e * phi.sin();
    let y = WGS84_A * ((std::f64::consts::FRAC_PI_4 + phi/2.0).tan() * ((1.0 - es)/(1.0 + es)).powf(e/2.0)).ln();
    (WGS84_A * lon.to_radians(), y)
}

/// expected (col_off, row_off, width, height) of the boundary window within `grid`
fn expected_window (grid: &Grid, project: fn(f64,f64)->(f64,f64)) -> (usize,usize,usize,usize) {
    let pts: Vec<(f64,f64)> = LON.iter().flat_map( |lon| LAT.iter().map( move |lat| project(*lon,*lat))).collect();
    let x_min = pts.iter().map( |p| p.0).fold( f64::INFINITY, f64::min);
    let x_max = pts.iter().map( |p| p.0).fold( f64::NEG_INFINITY, f64::max);
    let y_min = pts.iter().map( |p| p.1).fold( f64::INFINITY, f64::min);
    let y_max = pts.iter().map( |p| p.1).fold( f64::NEG_INFINITY, f64::max);

    let gt = &grid.geo_transform;
    let d = gt[1];
    let col0 = ((x_min - gt[0]) / d).floor() as usize;
    let col1 = ((x_max - gt[0]) / d).ceil() as usize;
    let row0 = ((gt[3] - y_max) / d).floor() as usize;
    let row1 = ((gt[3] - y_min) / d).ceil() as usize;
    (col0, row0, col1 - col0, row1 - row0)
}

fn assert_window (clipped: &Clipped, grid: &Grid, (col_off,row_off,width,height): (usize,usize,usize,usize)) -> Result<()> {
    let gt = clipped.ds.geo_transform()?;
    let src = &grid.geo_transform;
    println!("expected window: {:?}, clipped geotransform: {:?}", (col_off,row_off,width,height), gt);

    assert_eq!( clipped.ds.raster_size(), (width,height));
    assert!( (gt[0] - (src[0] + col_off as f64 * src[1])).abs() < 1e-6);
    assert!( (gt[3] - (src[3] + row_off as f64 * src[5])).abs() < 1e-6);
    assert_eq!( (gt[1], gt[5]), (src[1], src[5]));

    let srs = with_gis_order( clipped.ds.spatial_ref()?);
    let src_srs = srs_epsg( grid.epsg.unwrap_or(0))?;
    assert!( srs == src_srs);
    Ok(())
}

#[test]
fn test_per_raster_reprojection () -> Result<()> {
    let grids = [
        Grid::new( 3857, 0.0, 100_000.0, 1000.0, 100, 100),
        Grid::new( 3857, -50_000.0, 150_000.0, 500.0, 300, 300),
        Grid::new( 3395, 0.0, 100_000.0, 1000.0, 100, 100),
    ];
    let rasters = vec![ raster( "a1.tif", &grids[0])?, raster( "a2.tif", &grids[1])?, raster( "b.tif", &grids[2])? ];
    let parts = shapefile_parts( "boundary", Some(4326), &[BOUNDARY])?;

    let outcome = clip_batch( &request( parts, rasters), &ClipConfig::default())?;
    assert!( outcome.failures.is_empty());
    assert_eq!( outcome.results.len(), 3);

    let w1 = expected_window( &grids[0], pseudo_mercator);
    let w2 = expected_window( &grids[1], pseudo_mercator);
    let w3 = expected_window( &grids[2], world_mercator);

    assert_window( &Clipped::open( &outcome.results[0].data)?, &grids[0], w1)?;
    assert_window( &Clipped::open( &outcome.results[1].data)?, &grids[1], w2)?;
    assert_window( &Clipped::open( &outcome.results[2].data)?, &grids[2], w3)?;

    // same grid layout but different coordinate systems have to produce different windows
    assert_ne!( w1, w3);
    Ok(())
}
