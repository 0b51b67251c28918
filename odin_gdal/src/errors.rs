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

use thiserror::Error;
use gdal::errors::GdalError;

pub type Result<T> = std::result::Result<T, OdinGdalError>;

#[derive(Error,Debug)]
pub enum OdinGdalError {
    #[error("no spatial reference system")]
    NoSpatialReferenceSystem,

    #[error("no geo transform")]
    NoGeoTransform,

    #[error("rotated geo transform not supported")]
    RotatedGeoTransform,

    #[error("no raster bands")]
    NoRasterBands,

    #[error("raster bands differ in size or data type")]
    NotHomogenous,

    #[error("unsupported geometry {0}")]
    UnsupportedGeometry(String),

    #[error("unsupported data type {0}")]
    UnsupportedDataType(String),

    #[error("geometries do not overlap raster")]
    NoOverlap,

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    // pass through for errors in gdal crate
    #[error("gdal error {0}")]
    Error( #[from] GdalError),

    #[error("gdal error {0}")]
    MiscError(String),
}

pub fn misc_error(s: impl ToString) -> OdinGdalError {
    OdinGdalError::MiscError(s.to_string())
}

pub fn unsupported_geometry(s: impl ToString) -> OdinGdalError {
    OdinGdalError::UnsupportedGeometry(s.to_string())
}
