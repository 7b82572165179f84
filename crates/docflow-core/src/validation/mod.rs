//! Validation modules

pub mod upload;

pub use upload::{
    infer_content_type, validate_comment, validate_upload, UploadPath,
};
