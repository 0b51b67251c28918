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

//! fixtures for odin_clip tests. All input files are generated with GDAL drivers at test time

use std::{fs, io::{Cursor,Read}, path::Path};
use anyhow::Result;
use tempfile::TempDir;
use odin_gdal::{srs_epsg, Buffer, Dataset, DriverManager, GdalType, GeoTransform, GTIFF_DRIVER, SHAPEFILE_DRIVER};
use odin_gdal::gdal::vector::{Geometry, LayerAccess, LayerOptions, OGRwkbGeometryType};
use odin_clip::{BatchRequest, Upload};

pub const NODATA: f64 = -9999.0;

/// grid layout of a generated GeoTIFF
pub struct Grid {
    pub epsg: Option<u32>,
    pub geo_transform: GeoTransform,
    pub cols: usize,
    pub rows: usize,
    pub n_bands: usize,
    pub no_data: Option<f64>,
}

impl Grid {
    pub fn new (epsg: u32, x0: f64, y0: f64, pixel_size: f64, cols: usize, rows: usize) -> Self {
        Grid { epsg: Some(epsg), geo_transform: [x0, pixel_size, 0.0, y0, 0.0, -pixel_size], cols, rows, n_bands: 1, no_data: Some(NODATA) }
    }

    /// (x_min, y_min, x_max, y_max)
    pub fn extent (&self) -> (f64,f64,f64,f64) {
        let gt = &self.geo_transform;
        (gt[0], gt[3] + self.rows as f64 * gt[5], gt[0] + self.cols as f64 * gt[1], gt[3])
    }
}

/// encoded GeoTIFF with pixel values computed by `f(band,col,row)`
pub fn geotiff_bytes<T,F> (grid: &Grid, f: F) -> Result<Vec<u8>> where T: GdalType + Copy, F: Fn(usize,usize,usize)->T {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fixture.tif");
    {
        let driver = DriverManager::get_driver_by_name( GTIFF_DRIVER)?;
        let mut ds = driver.create_with_band_type::<T,_>( &path, grid.cols, grid.rows, grid.n_bands)?;
        ds.set_geo_transform( &grid.geo_transform)?;
        if let Some(epsg) = grid.epsg {
            ds.set_spatial_ref( &srs_epsg(epsg)?)?;
        }

        for k in 1..=grid.n_bands {
            let mut band = ds.rasterband(k)?;
            if grid.no_data.is_some() { band.set_no_data_value( grid.no_data)?; }

            let mut data: Vec<T> = Vec::with_capacity( grid.cols * grid.rows);
            for row in 0..grid.rows {
                for col in 0..grid.cols {
                    data.push( f(k,col,row));
                }
            }
            let mut buf = Buffer::new( (grid.cols, grid.rows), data);
            band.write( (0,0), (grid.cols, grid.rows), &mut buf)?;
        }
    } // dataset closed here
    Ok( fs::read( &path)? )
}

/// the default test raster: i16 values `row*100 + col + 1`
pub fn raster (name: &str, grid: &Grid) -> Result<Upload> {
    let data = geotiff_bytes::<i16,_>( grid, |_,col,row| (row*100 + col + 1) as i16)?;
    Ok( Upload::new( name, data) )
}

/// all files of a shapefile with the given polygon WKTs, sorted by name
pub fn shapefile_parts (base_name: &str, epsg: Option<u32>, wkts: &[&str]) -> Result<Vec<Upload>> {
    let dir = tempfile::tempdir()?;
    {
        let driver = DriverManager::get_driver_by_name( SHAPEFILE_DRIVER)?;
        let mut ds = driver.create_vector_only( dir.path().join( format!("{base_name}.shp")))?;
        let srs = match epsg { Some(epsg) => Some( srs_epsg(epsg)?), None => None };
        let mut layer = ds.create_layer( LayerOptions {
            name: base_name,
            srs: srs.as_ref(),
            ty: OGRwkbGeometryType::wkbPolygon,
            options: None
        })?;
        for wkt in wkts {
            layer.create_feature( Geometry::from_wkt(wkt)?)?;
        }
    }

    let mut parts = Vec::new();
    for e in fs::read_dir( dir.path())? {
        let path = e?.path();
        if path.is_file() { parts.push( Upload::from_path( &path)?); }
    }
    parts.sort_by( |a,b| a.name.cmp( &b.name));
    Ok(parts)
}

pub fn without_part (parts: Vec<Upload>, ext: &str) -> Vec<Upload> {
    parts.into_iter().filter( |p| !p.name.to_lowercase().ends_with( &format!(".{ext}"))).collect()
}

/// an opened clip result. The dataset has to be dropped before its directory
pub struct Clipped {
    pub ds: Dataset,
    _dir: TempDir,
}

impl Clipped {
    pub fn open (data: &[u8]) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("clipped.tif");
        fs::write( &path, data)?;
        let ds = Dataset::open( &path)?;
        Ok( Clipped { ds, _dir: dir } )
    }

    pub fn values<T: GdalType + Copy> (&self, band: usize) -> Result<Vec<T>> {
        let (w,h) = self.ds.raster_size();
        let buf = self.ds.rasterband(band)?.read_as::<T>( (0,0), (w,h), (w,h), None)?;
        Ok( buf.data().to_vec() )
    }

    /// (x_min, y_min, x_max, y_max) of a north up raster
    pub fn extent (&self) -> Result<(f64,f64,f64,f64)> {
        let gt = self.ds.geo_transform()?;
        let (w,h) = self.ds.raster_size();
        Ok( (gt[0], gt[3] + h as f64 * gt[5], gt[0] + w as f64 * gt[1], gt[3]) )
    }
}

/// (name, content) of all entries in archive order
pub fn unzip (archive: &[u8]) -> Result<Vec<(String,Vec<u8>)>> {
    let mut zip = zip::ZipArchive::new( Cursor::new( archive))?;
    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let mut data = Vec::new();
        file.read_to_end( &mut data)?;
        entries.push( (file.name().to_string(), data));
    }
    Ok(entries)
}

pub fn request (vector_parts: Vec<Upload>, rasters: Vec<Upload>) -> BatchRequest {
    BatchRequest { vector_parts, rasters }
}
