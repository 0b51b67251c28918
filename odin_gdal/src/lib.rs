/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
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

pub mod errors;
pub mod vector;
pub mod mask;

use gdal::{errors::CplErrType, raster::RasterCreationOptions, DatasetOptions, GdalOpenFlags};
use lazy_static::lazy_static;
use static_init::{constructor};
use std::{collections::HashMap, path::{Path,PathBuf}, sync::atomic::{AtomicUsize,Ordering}};
use tracing::debug;

// we re-export these so that other crates don't have to use a direct gdal depedency to import.
// this is to ensure we run bindgen for new GDAL versions that don't yet have pre-computed bindings in gdal-sys
pub use gdal::{self, Driver, DriverManager, Dataset, errors::GdalError, GeoTransform, GeoTransformEx};
pub use gdal::raster::{GdalType,GdalDataType,RasterBand,Buffer};
pub use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};

use crate::errors::{Result, misc_error, OdinGdalError};

/// the only raster format we read and write
pub const GTIFF_DRIVER: &str = "GTiff";

/// the only vector format we read boundaries from
pub const SHAPEFILE_DRIVER: &str = "ESRI Shapefile";

lazy_static! {
    // note that we can't automatically populate this by iterating over DriverManager since some
    // drivers use the same file extension
    static ref EXT_MAP: HashMap<&'static str, &'static str> = HashMap::from( [ // file extension -> driver short name
        ("tif", GTIFF_DRIVER),
        ("tiff", GTIFF_DRIVER),
        ("shp", SHAPEFILE_DRIVER),
    ]);
}

/// sequence number for /vsimem/ files so that concurrent encodings never share a name
static VSIMEM_SEQ: AtomicUsize = AtomicUsize::new(0);

#[constructor(0)]
extern "C" fn _initialize_gdal() {
    gdal::config::set_error_handler(trace_gdal_error);
}

// GDAL reports failures through return values as well, we only keep the console clean and the messages traceable
fn trace_gdal_error (cpl_et: CplErrType, ec: i32, msg: &str) {
    debug!("GDAL {:?} ({}): {}", cpl_et, ec, msg);
}

/// the last '.' separated component of a filename. Everything up to the last path separator is ignored
pub fn get_filename_extension (filename: &str) -> Option<&str> {
    let fname = filename.rsplit( |c| c == '/' || c == '\\').next().unwrap_or(filename);
    if let Some(idx) = fname.rfind('.') {
        if idx < fname.len()-1 {
            return Some( &fname[idx+1..] )
        }
    }
    None
}

/// case insensitive check if `filename` has the given extension (without the leading '.')
pub fn has_extension (filename: &str, ext: &str) -> bool {
    get_filename_extension(filename).map( |e| e.eq_ignore_ascii_case(ext)).unwrap_or(false)
}

/// Note that filename extension has to be lower case
pub fn get_driver_name_from_filename (filename: &str) -> Option<&'static str> {
    get_filename_extension(filename).and_then( |ext| EXT_MAP.get( ext)).map(|v| &**v)
}

/// open a raster dataset read-only. We only accept GeoTIFF input
pub fn open_raster<P:AsRef<Path>> (path: P)->Result<Dataset> {
    let dso = DatasetOptions {
        open_flags: GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_READONLY,
        allowed_drivers: Some(&[GTIFF_DRIVER]),
        open_options: None,
        sibling_files: None
    };
    Ok( Dataset::open_ex(path, dso)? )
}

/// open a vector dataset read-only. The path has to refer to the primary file of a shapefile, the
/// companion files (.shx, .dbf, .prj, ..) have to reside in the same directory under the same base name
pub fn open_vector<P:AsRef<Path>> (path: P)->Result<Dataset> {
    let dso = DatasetOptions {
        open_flags: GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY,
        allowed_drivers: Some(&[SHAPEFILE_DRIVER]),
        open_options: None,
        sibling_files: None
    };
    Ok( Dataset::open_ex(path, dso)? )
}

pub fn to_creation_options (strings: &[String]) -> Result<Option<RasterCreationOptions>> {
    if ! strings.is_empty() { // don't allocate if there is nothing to convert
        let mut co_list = RasterCreationOptions::new();
        for s in strings {
            co_list.add_string(s.as_str())?;
        }
        Ok(Some(co_list))
    } else {
        Ok(None)
    }
}

/// we only support grids that are aligned with the axes of their SRS
pub fn is_north_up (gt: &GeoTransform) -> bool {
    gt[2] == 0.0 && gt[4] == 0.0 && gt[1] != 0.0 && gt[5] != 0.0
}

/* #region SpatialRef based coordinate transformations ***********************************************************/

/// make sure the SpatialRef uses x=easting/longitude and y=northing/latitude regardless of its authority definition
pub fn with_gis_order (mut srs: SpatialRef) -> SpatialRef {
    srs.set_axis_mapping_strategy( AxisMappingStrategy::TraditionalGisOrder);
    srs
}

pub fn srs_from_wkt (wkt: &str) -> Result<SpatialRef> {
    Ok( with_gis_order( SpatialRef::from_wkt(wkt)?) )
}

pub fn srs_epsg (epsg: u32) -> Result<SpatialRef> {
    Ok( with_gis_order( SpatialRef::from_epsg(epsg)?) )
}

/* #endregion SpatialRef based coordinate transformations */

/* #region dataset creation and in-memory encoding ************************************************************************/

/// check if dimensions and raster type of all bands are the same
pub fn is_homogenous (ds: &Dataset)->bool {
    let (n_cols, n_rows) = ds.raster_size();
    let n_bands = ds.raster_count();
    if n_bands == 0 { return false }

    let band_type = match ds.rasterband(1) {
        Ok(band) => band.band_type(),
        Err(_) => return false
    };

    for i in 1..=n_bands {
        match ds.rasterband(i) {
            Ok(band) => {
                if band.band_type() != band_type { return false }
                let (w,h) = band.size();
                if w != n_cols || h != n_rows { return false }
            }
            Err(_) => return false
        }
    }

    true
}

pub fn create_dataset<P> (driver: &Driver, path: P, width: usize, height: usize, n_bands: usize, data_type: GdalDataType, co: Option<&RasterCreationOptions>)->Result<Dataset>
    where P: AsRef<Path>
{
    use GdalDataType::*;
    if let Some(co) = co {
        match data_type {
            UInt8   => Ok( driver.create_with_band_type_with_options::<u8,P>(path, width, height, n_bands, co)? ),
            UInt16  => Ok( driver.create_with_band_type_with_options::<u16,P>(path, width, height, n_bands, co)? ),
            UInt32  => Ok( driver.create_with_band_type_with_options::<u32,P>(path, width, height, n_bands, co)? ),
            UInt64  => Ok( driver.create_with_band_type_with_options::<u64,P>(path, width, height, n_bands, co)? ),
            Int8    => Ok( driver.create_with_band_type_with_options::<i8,P>(path, width, height, n_bands, co)? ),
            Int16   => Ok( driver.create_with_band_type_with_options::<i16,P>(path, width, height, n_bands, co)? ),
            Int32   => Ok( driver.create_with_band_type_with_options::<i32,P>(path, width, height, n_bands, co)? ),
            Int64   => Ok( driver.create_with_band_type_with_options::<i64,P>(path, width, height, n_bands, co)? ),
            Float32 => Ok( driver.create_with_band_type_with_options::<f32,P>(path, width, height, n_bands, co)? ),
            Float64 => Ok( driver.create_with_band_type_with_options::<f64,P>(path, width, height, n_bands, co)? ),
            _ => Err( OdinGdalError::UnsupportedDataType(format!("{data_type:?}")))
        }

    } else {
        match data_type {
            UInt8   => Ok( driver.create_with_band_type::<u8,P>(path, width, height, n_bands)? ),
            UInt16  => Ok( driver.create_with_band_type::<u16,P>(path, width, height, n_bands)? ),
            UInt32  => Ok( driver.create_with_band_type::<u32,P>(path, width, height, n_bands)? ),
            UInt64  => Ok( driver.create_with_band_type::<u64,P>(path, width, height, n_bands)? ),
            Int8    => Ok( driver.create_with_band_type::<i8,P>(path, width, height, n_bands)? ),
            Int16   => Ok( driver.create_with_band_type::<i16,P>(path, width, height, n_bands)? ),
            Int32   => Ok( driver.create_with_band_type::<i32,P>(path, width, height, n_bands)? ),
            Int64   => Ok( driver.create_with_band_type::<i64,P>(path, width, height, n_bands)? ),
            Float32 => Ok( driver.create_with_band_type::<f32,P>(path, width, height, n_bands)? ),
            Float64 => Ok( driver.create_with_band_type::<f64,P>(path, width, height, n_bands)? ),
            _ => Err( OdinGdalError::UnsupportedDataType(format!("{data_type:?}")))
        }
    }
}

/// a process-unique GDAL in-memory file path for the given filename
pub fn vsimem_path (filename: &str) -> PathBuf {
    let seq = VSIMEM_SEQ.fetch_add( 1, Ordering::Relaxed);
    PathBuf::from( format!("/vsimem/odin_{}_{}_{}", std::process::id(), seq, filename))
}

/// description of a raster dataset to create
#[derive(Debug,Clone,Copy)]
pub struct RasterSpec {
    pub width: usize,
    pub height: usize,
    pub n_bands: usize,
    pub data_type: GdalDataType,
}

/// create a dataset with the given driver inside GDAL's /vsimem/ file system, let `fill` set its meta info and
/// pixel data, and return the encoded bytes of the closed dataset. The in-memory file is released on all paths
pub fn encode_in_memory<F> (driver_name: &str, filename: &str, spec: &RasterSpec, co: Option<&RasterCreationOptions>, fill: F) -> Result<Vec<u8>>
    where F: FnOnce(&mut Dataset)->Result<()>
{
    let driver = DriverManager::get_driver_by_name(driver_name)?;
    let path = vsimem_path(filename);

    let mut ds = create_dataset( &driver, &path, spec.width, spec.height, spec.n_bands, spec.data_type, co)?;
    let res = fill( &mut ds);
    drop(ds); // this flushes and closes the dataset, the /vsimem/ file is complete after this point

    match res {
        Ok(()) => {
            // this also unlinks the in-memory file
            Ok( gdal::vsi::get_vsi_mem_file_bytes_owned( &path)? )
        }
        Err(e) => {
            let _ = gdal::vsi::unlink_mem_file( &path);
            Err(e)
        }
    }
}

/* #endregion dataset creation and in-memory encoding */

/* #region raster info ********************************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct RasterInfo {
    pub cols: usize,
    pub left: f64,
    pub right: f64,
    pub dx: f64,

    pub rows: usize,
    pub top: f64,
    pub bottom: f64,
    pub dy: f64
}

impl RasterInfo {
    /// (x_min, y_min, x_max, y_max) regardless of the sign of dx/dy
    pub fn extent (&self) -> (f64,f64,f64,f64) {
        (self.left.min(self.right), self.top.min(self.bottom), self.left.max(self.right), self.top.max(self.bottom))
    }
}

pub fn get_raster_info (ds: &Dataset)->Result<RasterInfo> {
    let (cols,rows) = ds.raster_size();
    let a = ds.geo_transform().map_err(|_| OdinGdalError::NoGeoTransform)?;

    let left = a[0];
    let dx = a[1];
    let right = left + (dx * cols as f64);

    let top = a[3];
    let dy = a[5];
    let bottom = top + (dy * rows as f64);

    Ok( RasterInfo { cols, left, right, dx, rows, top, bottom, dy } )
}

/* #endregion raster info */
