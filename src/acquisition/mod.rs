//! Raw data acquisition
//!
//! Turns on-disk instrument files into per-file channel arrays. Nothing
//! here filters or converts units; that happens in `reduction`.

pub mod csv_source;
pub mod raw;

pub use csv_source::CsvDirectorySource;
pub use raw::{Channels, PrimaryChannels, RawFile, RawSource, SecondaryChannels};
