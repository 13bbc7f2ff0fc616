//! Byte addressing of per-signal sample blocks.
//!
//! Within a data record the signals are concatenated, signal 0 first, each
//! contributing `samples_per_record` consecutive samples. A signal's block in
//! record `r` therefore starts at a fixed distance from the record start.

use crate::types::EdfHeader;

/// Byte offset of `signal`'s block from the start of any data record
///
/// # Panics
///
/// Panics if `signal` is out of range.
pub fn signal_offset_in_record(header: &EdfHeader, signal: usize) -> usize {
    let preceding: usize = header.signals[..signal]
        .iter()
        .map(|s| s.samples_per_record)
        .sum();
    preceding * header.bytes_per_sample()
}

/// Absolute file offset of `signal`'s sample block in data record `record`.
///
/// Returns `None` when the offset does not fit in a `u64`.
///
/// # Examples
///
/// ```rust
/// use edfread::doctest_utils::{build_header, FixtureSignal};
/// use edfread::{parse_header, sample_block_offset, FileVariant};
///
/// let signals = [FixtureSignal::new("A", 4), FixtureSignal::new("B", 2)];
/// let header = parse_header(&build_header(FileVariant::Edf, &signals, 1.0, 2))?;
///
/// assert_eq!(sample_block_offset(&header, 1, 0), Some(768 + 4 * 2));
/// assert_eq!(sample_block_offset(&header, 0, 1), Some(768 + (4 + 2) * 2));
/// assert_eq!(sample_block_offset(&header, 0, u64::MAX), None);
/// # Ok::<(), edfread::HeaderError>(())
/// ```
pub fn sample_block_offset(header: &EdfHeader, signal: usize, record: u64) -> Option<u64> {
    record
        .checked_mul(header.record_size() as u64)?
        .checked_add(header.header_size as u64)?
        .checked_add(signal_offset_in_record(header, signal) as u64)
}
