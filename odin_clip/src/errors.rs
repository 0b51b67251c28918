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

use serde::{Deserialize,Serialize};
use thiserror::Error;

use crate::batch::ClipFailure;

pub type Result<T> = std::result::Result<T, OdinClipError>;

/// classification of clip errors as it is reported in failure records
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum ErrorKind {
    MissingPrimaryFile,
    UnreadableVectorData,
    RasterUnreadable,
    NoOverlap,
    EncodingError,
    UnexpectedFailure,
}

#[derive(Error,Debug)]
pub enum OdinClipError {
    #[error("no primary vector file among {file}: {msg}")]
    MissingPrimaryFile { file: String, msg: String },

    #[error("unreadable vector data {file}: {msg}")]
    UnreadableVectorData { file: String, msg: String },

    #[error("unreadable raster {file}: {msg}")]
    RasterUnreadable { file: String, msg: String },

    #[error("raster {file} does not overlap boundary: {msg}")]
    NoOverlap { file: String, msg: String },

    #[error("encoding of {file} failed: {msg}")]
    EncodingError { file: String, msg: String },

    #[error("processing of {file} failed: {msg}")]
    UnexpectedFailure { file: String, msg: String },

    /// none of the rasters of a batch could be clipped
    #[error("no raster could be clipped ({} failures)", .0.len())]
    NoClipResults(Vec<ClipFailure>),

    #[error("config error {0}")]
    ConfigError( #[from] ron::error::SpannedError),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),
}

impl OdinClipError {
    pub fn kind (&self) -> ErrorKind {
        use OdinClipError::*;
        match self {
            MissingPrimaryFile{..} => ErrorKind::MissingPrimaryFile,
            UnreadableVectorData{..} => ErrorKind::UnreadableVectorData,
            RasterUnreadable{..} => ErrorKind::RasterUnreadable,
            NoOverlap{..} => ErrorKind::NoOverlap,
            EncodingError{..} => ErrorKind::EncodingError,
            _ => ErrorKind::UnexpectedFailure
        }
    }

    /// the upload (or upload set) this error refers to, if any
    pub fn file (&self) -> Option<&str> {
        use OdinClipError::*;
        match self {
            MissingPrimaryFile{file,..} | UnreadableVectorData{file,..} | RasterUnreadable{file,..} |
            NoOverlap{file,..} | EncodingError{file,..} | UnexpectedFailure{file,..} => Some(file.as_str()),
            _ => None
        }
    }
}

pub fn missing_primary_file (file: impl ToString, msg: impl ToString) -> OdinClipError {
    OdinClipError::MissingPrimaryFile { file: file.to_string(), msg: msg.to_string() }
}

pub fn unreadable_vector_data (file: impl ToString, msg: impl ToString) -> OdinClipError {
    OdinClipError::UnreadableVectorData { file: file.to_string(), msg: msg.to_string() }
}

pub fn raster_unreadable (file: impl ToString, msg: impl ToString) -> OdinClipError {
    OdinClipError::RasterUnreadable { file: file.to_string(), msg: msg.to_string() }
}

pub fn no_overlap (file: impl ToString, msg: impl ToString) -> OdinClipError {
    OdinClipError::NoOverlap { file: file.to_string(), msg: msg.to_string() }
}

pub fn encoding_error (file: impl ToString, msg: impl ToString) -> OdinClipError {
    OdinClipError::EncodingError { file: file.to_string(), msg: msg.to_string() }
}

pub fn unexpected_failure (file: impl ToString, msg: impl ToString) -> OdinClipError {
    OdinClipError::UnexpectedFailure { file: file.to_string(), msg: msg.to_string() }
}
