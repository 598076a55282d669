pub mod feed;
pub mod original_video;
pub mod saved_search;
pub mod source_import;
pub mod video;
