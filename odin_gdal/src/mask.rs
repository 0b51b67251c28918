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

//! masking and cropping of rasters with polygon shapes.
//!
//! The crop window is the envelope of all shapes in pixel space, expanded outwards to whole pixels and
//! intersected with the raster. Inside this window pixels that are not covered by any shape are set to the
//! nodata value of their band (or 0 if the band does not define one). A pixel is covered if its center is
//! inside a polygon, or - with `all_touched` - if its cell intersects a polygon.
//! All shapes have to be in the SRS of the raster.

use geo::{Coord, Intersects, MapCoords, MultiPolygon, Polygon, Rect, BoundingRect};
use gdal::raster::RasterCreationOptions;
use num::NumCast;

use crate::{
    Dataset, GdalDataType, GdalType, GeoTransform, GeoTransformEx, RasterBand, Buffer, RasterSpec,
    encode_in_memory, is_homogenous, is_north_up, GTIFF_DRIVER
};
use crate::vector::shapes_bounding_rect;
use crate::errors::{Result, OdinGdalError, misc_error};

/// sample value used for masked pixels of bands that do not have a nodata value
pub const MASK_FILL: f64 = 0.0;

#[derive(Debug,Clone,Copy,Default)]
pub struct MaskOptions {
    pub all_touched: bool,
}

/// sub-region of a raster in pixel coordinates
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn len (&self) -> usize { self.width * self.height }
}

/// the pixel window covering the envelope of `shapes`, clipped to a raster of `raster_size` (cols,rows).
/// Returns None if the shapes do not overlap the raster
pub fn geometry_window (gt: &GeoTransform, raster_size: (usize,usize), shapes: &[MultiPolygon<f64>]) -> Result<Option<PixelWindow>> {
    let bbox = match shapes_bounding_rect(shapes) {
        Some(bbox) => bbox,
        None => return Ok(None)
    };
    let inv = gt.invert()?;

    let corners = [
        inv.apply( bbox.min().x, bbox.min().y),
        inv.apply( bbox.min().x, bbox.max().y),
        inv.apply( bbox.max().x, bbox.min().y),
        inv.apply( bbox.max().x, bbox.max().y),
    ];
    if corners.iter().any( |(c,r)| !c.is_finite() || !r.is_finite()) {
        return Err( misc_error("non-finite shape bounds"))
    }

    let min_col = corners.iter().map( |p| p.0).fold( f64::INFINITY, f64::min);
    let max_col = corners.iter().map( |p| p.0).fold( f64::NEG_INFINITY, f64::max);
    let min_row = corners.iter().map( |p| p.1).fold( f64::INFINITY, f64::min);
    let max_row = corners.iter().map( |p| p.1).fold( f64::NEG_INFINITY, f64::max);

    let (cols, rows) = raster_size;
    let col_start = min_col.floor().max(0.0);
    let col_stop = max_col.ceil().min(cols as f64);
    let row_start = min_row.floor().max(0.0);
    let row_stop = max_row.ceil().min(rows as f64);

    if col_stop <= col_start || row_stop <= row_start {
        return Ok(None)
    }

    Ok( Some( PixelWindow {
        col_off: col_start as usize,
        row_off: row_start as usize,
        width: (col_stop - col_start) as usize,
        height: (row_stop - row_start) as usize,
    }))
}

/// geotransform of a window within a raster with geotransform `gt`
pub fn window_geotransform (gt: &GeoTransform, win: &PixelWindow) -> GeoTransform {
    let (x0,y0) = gt.apply( win.col_off as f64, win.row_off as f64);
    [x0, gt[1], gt[2], y0, gt[4], gt[5]]
}

/// map world coordinate shapes into (fractional) pixel coordinates of a raster with geotransform `gt`
pub fn to_pixel_space (gt: &GeoTransform, shapes: &[MultiPolygon<f64>]) -> Result<Vec<MultiPolygon<f64>>> {
    let inv = gt.invert()?;
    let inv = &inv;
    Ok( shapes.iter().map( |mp| mp.map_coords( |c| {
        let (x,y) = inv.apply( c.x, c.y);
        Coord{x,y}
    })).collect() )
}

/// compute the row-major coverage mask of `win` for shapes given in pixel coordinates
pub fn coverage_mask (pixel_shapes: &[MultiPolygon<f64>], win: &PixelWindow, opts: &MaskOptions) -> Vec<bool> {
    let mut mask = vec![false; win.len()];

    for poly in pixel_shapes.iter().flat_map( |mp| mp.0.iter()) {
        if opts.all_touched {
            mark_touched( poly, win, &mut mask);
        } else {
            mark_centers( poly, win, &mut mask);
        }
    }

    mask
}

// even-odd scanline fill of pixel centers for a single polygon (including its holes)
fn mark_centers (poly: &Polygon<f64>, win: &PixelWindow, mask: &mut [bool]) {
    let bbox = match poly.bounding_rect() { Some(bbox) => bbox, None => return };

    let row0 = win.row_off;
    let row1 = win.row_off + win.height;
    let col0 = win.col_off as f64;
    let col1 = (win.col_off + win.width) as f64;
    let mut crossings: Vec<f64> = Vec::new();

    for row in row0..row1 {
        let yc = row as f64 + 0.5;
        if yc < bbox.min().y || yc > bbox.max().y { continue }

        crossings.clear();
        for ring in std::iter::once( poly.exterior()).chain( poly.interiors().iter()) {
            for line in ring.lines() {
                let (p,q) = (line.start, line.end);
                if (p.y > yc) != (q.y > yc) {
                    crossings.push( p.x + (yc - p.y) * (q.x - p.x) / (q.y - p.y));
                }
            }
        }
        crossings.sort_by( |a,b| a.total_cmp(b));

        let offset = (row - row0) * win.width;
        for span in crossings.chunks_exact(2) {
            // pixel centers c+0.5 within [x0,x1)
            let c_start = (span[0] - 0.5).ceil().max(col0);
            let c_stop = (span[1] - 0.5).ceil().min(col1);
            if c_stop > c_start {
                let i0 = c_start as usize - win.col_off;
                let i1 = c_stop as usize - win.col_off;
                mask[offset + i0 .. offset + i1].fill(true);
            }
        }
    }
}

// mark all pixels whose cell intersects the polygon
fn mark_touched (poly: &Polygon<f64>, win: &PixelWindow, mask: &mut [bool]) {
    let bbox = match poly.bounding_rect() { Some(bbox) => bbox, None => return };

    let col_start = (bbox.min().x.floor().max( win.col_off as f64)) as usize;
    let col_stop = (bbox.max().x.ceil().min( (win.col_off + win.width) as f64)).max(col_start as f64) as usize;
    let row_start = (bbox.min().y.floor().max( win.row_off as f64)) as usize;
    let row_stop = (bbox.max().y.ceil().min( (win.row_off + win.height) as f64)).max(row_start as f64) as usize;

    for row in row_start..row_stop {
        let offset = (row - win.row_off) * win.width;
        for col in col_start..col_stop {
            let idx = offset + col - win.col_off;
            if !mask[idx] {
                let cell = Rect::new( Coord{ x: col as f64, y: row as f64}, Coord{ x: (col+1) as f64, y: (row+1) as f64});
                if poly.intersects( &cell) {
                    mask[idx] = true;
                }
            }
        }
    }
}

/* #region masked raster *****************************************************************************************/

/// the result of masking and cropping a source dataset. Pixel data is read from the source when the
/// masked raster gets written
pub struct MaskedRaster<'a> {
    src: &'a Dataset,
    pub window: PixelWindow,
    pub geo_transform: GeoTransform,
    pub data_type: GdalDataType,
    pub n_bands: usize,
    mask: Vec<bool>,
}

/// mask and crop `ds` with `shapes` (which have to be in the SRS of `ds`).
/// Fails with `OdinGdalError::NoOverlap` if the shapes do not intersect the raster extent, and with
/// `NoRasterBands`, `NotHomogenous`, `NoGeoTransform` or `RotatedGeoTransform` if the grid of `ds`
/// cannot be masked
pub fn mask_and_crop<'a> (ds: &'a Dataset, shapes: &[MultiPolygon<f64>], opts: &MaskOptions) -> Result<MaskedRaster<'a>> {
    let n_bands = ds.raster_count();
    if n_bands < 1 { return Err( OdinGdalError::NoRasterBands) }
    if !is_homogenous(ds) { return Err( OdinGdalError::NotHomogenous) }

    let gt = ds.geo_transform().map_err( |_| OdinGdalError::NoGeoTransform)?;
    if !is_north_up(&gt) { return Err( OdinGdalError::RotatedGeoTransform) }

    let window = geometry_window( &gt, ds.raster_size(), shapes)?.ok_or( OdinGdalError::NoOverlap)?;
    let pixel_shapes = to_pixel_space( &gt, shapes)?;
    let mask = coverage_mask( &pixel_shapes, &window, opts);

    let data_type = ds.rasterband(1)?.band_type();
    let geo_transform = window_geotransform( &gt, &window);

    Ok( MaskedRaster { src: ds, window, geo_transform, data_type, n_bands, mask } )
}

impl<'a> MaskedRaster<'a> {
    pub fn width (&self) -> usize { self.window.width }
    pub fn height (&self) -> usize { self.window.height }

    /// number of pixels per band that are covered by the shapes
    pub fn n_covered (&self) -> usize { self.mask.iter().filter( |b| **b).count() }

    pub fn raster_spec (&self) -> RasterSpec {
        RasterSpec { width: self.window.width, height: self.window.height, n_bands: self.n_bands, data_type: self.data_type }
    }

    /// write geotransform, SRS, nodata and masked pixel data into `tgt`, which has to be of our raster spec
    pub fn write_to (&self, tgt: &mut Dataset) -> Result<()> {
        tgt.set_geo_transform( &self.geo_transform)?;
        if let Ok(srs) = self.src.spatial_ref() {
            tgt.set_spatial_ref( &srs)?;
        }

        for k in 1..=self.n_bands {
            let src_band = self.src.rasterband(k)?;
            let mut tgt_band = tgt.rasterband(k)?;
            let no_data = src_band.no_data_value();
            if no_data.is_some() { tgt_band.set_no_data_value( no_data)?; }

            self.write_masked_band( &src_band, &mut tgt_band, no_data.unwrap_or(MASK_FILL))?;
        }
        Ok(())
    }

    /// encode as GeoTIFF into a byte vector (without touching the file system)
    pub fn encode_gtiff (&self, filename: &str, co: Option<&RasterCreationOptions>) -> Result<Vec<u8>> {
        encode_in_memory( GTIFF_DRIVER, filename, &self.raster_spec(), co, |tgt| self.write_to(tgt))
    }

    fn write_masked_band (&self, src: &RasterBand, tgt: &mut RasterBand, fill: f64) -> Result<()> {
        use GdalDataType::*;

        match self.data_type {
            UInt8   => self.write_masked_band_type::<u8>( src, tgt, fill),
            UInt16  => self.write_masked_band_type::<u16>( src, tgt, fill),
            UInt32  => self.write_masked_band_type::<u32>( src, tgt, fill),
            UInt64  => self.write_masked_band_type::<u64>( src, tgt, fill),
            Int8    => self.write_masked_band_type::<i8>( src, tgt, fill),
            Int16   => self.write_masked_band_type::<i16>( src, tgt, fill),
            Int32   => self.write_masked_band_type::<i32>( src, tgt, fill),
            Int64   => self.write_masked_band_type::<i64>( src, tgt, fill),
            Float32 => self.write_masked_band_type::<f32>( src, tgt, fill),
            Float64 => self.write_masked_band_type::<f64>( src, tgt, fill),
            dt => Err( OdinGdalError::UnsupportedDataType(format!("{dt:?}")))
        }
    }

    fn write_masked_band_type<T> (&self, src: &RasterBand, tgt: &mut RasterBand, fill: f64) -> Result<()>
        where T: Copy + GdalType + NumCast
    {
        let win = &self.window;
        let fill: T = NumCast::from(fill).ok_or_else( || misc_error( format!("fill value {fill} not representable in band type")))?;

        let mut buf: Buffer<T> = src.read_as::<T>( (win.col_off as isize, win.row_off as isize), (win.width, win.height), (win.width, win.height), None)?;
        for (v,covered) in buf.data_mut().iter_mut().zip( self.mask.iter()) {
            if !covered { *v = fill }
        }

        tgt.write( (0,0), (win.width, win.height), &mut buf)?;
        Ok(())
    }
}

/* #endregion masked raster */
