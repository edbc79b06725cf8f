pub mod csv;

pub use csv::{read_error_series, read_error_series_file, ErrorColumn, TrackingLog};
