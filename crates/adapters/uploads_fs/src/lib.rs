//! # labhub-adapter-uploads-fs
//!
//! Private on-disk storage for uploaded model files.
//!
//! ## Layout
//! Files live under `<root>/uploads/<model>/<mounted_as>/<id>/<file name>`;
//! for job models that is `uploads/job/model/<job id>/`. Writes go to
//! `<root>/uploads/tmp` first and are renamed into place, so readers never
//! see a partial file. Directories are created `0700` and files `0600`.
//!
//! The returned key is the path relative to the root. Nothing here is
//! served statically: downloads go through the authorized API.

pub mod error;
pub mod store;

pub use error::UploadError;
pub use store::FsModelStore;
