pub mod scan_view_model;

pub use scan_view_model::{ResultRow, ScanViewModel};
