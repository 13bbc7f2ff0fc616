//! # edfread
//!
//! A pure Rust random-access reader for EDF (16-bit) and BDF (24-bit)
//! biosignal files.
//!
//! A file is a fixed-layout ASCII header followed by data records. Every
//! record holds, signal after signal, a fixed number of little-endian samples
//! per signal, and signals may have different sample counts per record. The
//! reader keeps one cursor per signal and fetches only the bytes a request
//! needs, so large recordings are never loaded as a whole.
//!
//! ## Quick Start
//!
//! ```rust
//! use edfread::{EdfReader, Result};
//!
//! fn main() -> Result<()> {
//!     # edfread::doctest_utils::create_multi_channel_test_file("quick_start.edf")?;
//!     let mut reader = EdfReader::open("quick_start.edf")?;
//!
//!     let records = reader.number_of_data_records()?;
//!     let header = reader.header();
//!     println!("{:?} file with {} signals", header.file_variant, header.signal_count());
//!     println!("Duration: {:.1} s", header.file_duration_seconds(records));
//!
//!     for (i, signal) in header.signals.iter().enumerate() {
//!         println!("Signal {}: {} [{}], {:?} Hz",
//!             i, signal.label, signal.physical_dimension, header.sample_rate(i));
//!     }
//!
//!     // Read the first 100 physical samples of signal 0
//!     let mut buffer = vec![0.0; 100];
//!     let produced = reader.read_physical(0, &mut buffer)?;
//!     assert_eq!(produced, 100);
//!
//!     reader.close()?;
//!     # std::fs::remove_file("quick_start.edf").ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Physical vs Digital Values
//!
//! Samples are stored as integers ("digital" values). Each signal declares a
//! digital and a physical range; a linear map between the two gives the
//! measured ("physical") value:
//!
//! ```rust
//! use edfread::Calibration;
//!
//! let cal = Calibration::new(-32768, 32767, -100.0, 100.0);
//!
//! assert_eq!(cal.to_physical(32767), 100.0);
//! assert!((cal.to_physical(16384) - 50.0).abs() < 0.01);
//! assert!((cal.to_digital(25.0) - 8192).abs() <= 1);
//! ```
//!
//! ## Logging
//!
//! The crate reports through the [`log`](https://docs.rs/log) facade and never
//! installs a logger itself.

pub mod address;
pub mod calibration;
pub mod endian;
pub mod error;
pub mod header;
pub mod loader;
pub mod reader;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use address::sample_block_offset;
pub use calibration::Calibration;
pub use error::{EdfError, HeaderError, Result};
pub use header::{parse_header, read_header};
pub use loader::{load_channel, load_channels, ChannelData, LoadOptions};
pub use reader::EdfReader;
pub use types::{EdfHeader, FileVariant, PatientInfo, RecordingInfo, SignalParam};

// Important constants
pub const EDFLIB_MAXSIGNALS: usize = 4096;
/// Size of the fixed part of the header
pub const EDF_FIXED_HEADER_SIZE: usize = 256;
/// Header bytes added per signal
pub const EDF_SIGNAL_HEADER_SIZE: usize = 256;

/// Library version
///
/// Returns the current version of the edfread library.
///
/// # Examples
///
/// ```rust
/// let version = edfread::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
