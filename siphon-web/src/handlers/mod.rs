//! Request handlers for the Siphon HTTP surface.

mod download;
mod error;
mod files;
mod preview;

pub use download::download_media;
pub use error::ApiError;
pub use files::get_file;
pub use preview::preview_video;
