use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace, warn};

use crate::address::sample_block_offset;
use crate::calibration::Calibration;
use crate::endian::decode_le_slice;
use crate::error::{EdfError, Result};
use crate::header::read_header;
use crate::types::EdfHeader;
use crate::utils::read_fully;

/// Random-access reader for EDF and BDF files
///
/// `EdfReader` parses the header once at open time and then serves reads
/// for any signal from an independent per-signal sample cursor. Each read
/// issues positioned reads of one data record's worth of the signal's samples,
/// so the file is never loaded into memory as a whole.
///
/// Reading past the end of the data is not an error: the read simply
/// produces fewer samples than requested, possibly none.
///
/// # Examples
///
/// ## Basic usage
///
/// ```rust
/// use edfread::EdfReader;
///
/// # // Generate test file (hidden from docs)
/// # edfread::doctest_utils::create_simple_test_file("reader_basic.edf")?;
/// #
/// let mut reader = EdfReader::open("reader_basic.edf")?;
///
/// println!("Signals: {}", reader.header().signal_count());
/// println!("Records: {}", reader.number_of_data_records()?);
///
/// // Read one second of physical samples from the first signal
/// let samples = reader.read_physical_samples(0, 256)?;
/// assert_eq!(samples.len(), 256);
///
/// reader.close()?;
/// # std::fs::remove_file("reader_basic.edf").ok();
/// # Ok::<(), edfread::EdfError>(())
/// ```
///
/// ## Independent cursors
///
/// ```rust
/// use edfread::EdfReader;
///
/// # edfread::doctest_utils::create_multi_channel_test_file("reader_cursors.edf")?;
/// let mut reader = EdfReader::open("reader_cursors.edf")?;
///
/// // Signals advance separately, each at its own rate
/// reader.set_position(0, 512)?;
/// let eeg = reader.read_digital_samples(0, 4)?;
/// let resp = reader.read_digital_samples(1, 4)?;
///
/// assert_eq!(eeg, vec![5120, 5130, 5140, 5150]);
/// assert_eq!(resp, vec![0, -1, -2, -3]);
/// assert_eq!(reader.position(0)?, 516);
/// # std::fs::remove_file("reader_cursors.edf").ok();
/// # Ok::<(), edfread::EdfError>(())
/// ```
pub struct EdfReader<R = File> {
    /// 关闭后为 None
    source: Option<R>,
    header: EdfHeader,
    calibrations: Vec<Calibration>,
    /// 当前每个信号的样本位置指针
    sample_positions: Vec<u64>,
}

impl EdfReader<File> {
    /// Opens an EDF or BDF file for reading
    ///
    /// The header is read and validated immediately. On any failure the file
    /// is released before returning; no partially opened reader exists.
    ///
    /// # Errors
    ///
    /// * `EdfError::FileOpen` - the path is missing, unreadable or not a regular file
    /// * `EdfError::Header` - the header violates the fixed layout
    /// * `EdfError::Io` - reading the header failed
    ///
    /// # Examples
    ///
    /// ```rust
    /// use edfread::{EdfError, EdfReader};
    ///
    /// match EdfReader::open("does_not_exist.edf") {
    ///     Err(EdfError::FileOpen { path, .. }) => println!("missing: {}", path.display()),
    ///     Err(e) => println!("other error: {}", e),
    ///     Ok(_) => unreachable!(),
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source: io::Error| EdfError::FileOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_error)?;
        let metadata = file.metadata().map_err(open_error)?;
        if !metadata.is_file() {
            return Err(open_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let reader = Self::from_reader(file)?;
        debug!("Opened {}", path.display());
        Ok(reader)
    }
}

impl<R: Read + Seek> EdfReader<R> {
    /// Builds a reader over any seekable byte source, parsing its header.
    ///
    /// The header is read from the start of `source` regardless of its
    /// current position.
    pub fn from_reader(mut source: R) -> Result<Self> {
        source.seek(SeekFrom::Start(0))?;
        let header = read_header(&mut source)?;

        let calibrations = header.signals.iter().map(Calibration::from_signal).collect();
        let sample_positions = vec![0u64; header.signal_count()];

        let mut reader = EdfReader {
            source: Some(source),
            header,
            calibrations,
            sample_positions,
        };

        let file_len = reader.source_len()?;
        let records = reader.header.record_count(file_len);
        debug!(
            "{:?} file: {} signals, {} records of {} bytes, header {} bytes",
            reader.header.file_variant,
            reader.header.signal_count(),
            records,
            reader.header.record_size(),
            reader.header.header_size
        );

        let data_len = file_len.saturating_sub(reader.header.header_size as u64);
        if data_len % reader.header.record_size() as u64 != 0 {
            warn!(
                "Ignoring {} trailing bytes after the last complete data record",
                data_len % reader.header.record_size() as u64
            );
        }
        let declared = reader.header.datarecords_in_header;
        if declared >= 0 && declared as u64 != records {
            warn!(
                "Header declares {} data records but the file holds {}",
                declared, records
            );
        }

        Ok(reader)
    }

    /// Gets a reference to the parsed header
    ///
    /// The header is owned data and stays available after [`close`](Self::close).
    pub fn header(&self) -> &EdfHeader {
        &self.header
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Sets the sample cursor of `signal` to `position`.
    ///
    /// The position counts samples of that signal from the start of the data
    /// and is not checked against the number of samples in the file; reading
    /// from beyond the end just produces no samples. Other signals' cursors are
    /// unaffected.
    pub fn set_position(&mut self, signal: usize, position: u64) -> Result<()> {
        self.check_signal(signal)?;
        trace!("Signal {} cursor moved to {}", signal, position);
        self.sample_positions[signal] = position;
        Ok(())
    }

    /// Current sample cursor of `signal`
    pub fn position(&self, signal: usize) -> Result<u64> {
        self.check_signal(signal)?;
        Ok(self.sample_positions[signal])
    }

    /// Moves the cursor of `signal` back to its first sample
    pub fn rewind(&mut self, signal: usize) -> Result<()> {
        self.set_position(signal, 0)
    }

    /// Reads digital samples of `signal` into `buf`, starting at the signal's cursor.
    ///
    /// Returns the number of samples produced, which is less than `buf.len()`
    /// when the end of the data is reached. The cursor advances by exactly that
    /// number. To fill part of a larger buffer pass a sub-slice, e.g.
    /// `&mut buffer[offset..offset + count]`.
    ///
    /// If an I/O error occurs the call fails and the cursor is left where it was.
    ///
    /// # Errors
    ///
    /// * `EdfError::ResourceClosed` - the reader has been closed
    /// * `EdfError::InvalidSignalIndex` - `signal` is out of range
    /// * `EdfError::Io` - a positioned read failed
    pub fn read_digital(&mut self, signal: usize, buf: &mut [i32]) -> Result<usize> {
        self.check_signal(signal)?;
        if buf.is_empty() {
            return Ok(0);
        }

        let header = &self.header;
        let source = self.source.as_mut().ok_or(EdfError::ResourceClosed)?;

        let samples_per_record = header.signals[signal].samples_per_record;
        let width = header.bytes_per_sample();
        let start = self.sample_positions[signal];

        // 将样本位置换算为 (记录号, 记录内偏移)
        let mut record = start / samples_per_record as u64;
        let mut in_record = (start % samples_per_record as u64) as usize;
        let mut block = vec![0u8; samples_per_record * width];
        let mut produced = 0;

        while produced < buf.len() {
            let offset = match sample_block_offset(header, signal, record) {
                Some(offset) => offset,
                None => {
                    trace!("Signal {}: record {} is past the addressable range", signal, record);
                    break;
                }
            };
            source.seek(SeekFrom::Start(offset))?;
            let got = read_fully(source, &mut block)?;
            if got < block.len() {
                trace!(
                    "Signal {}: short read at record {} ({} of {} bytes)",
                    signal,
                    record,
                    got,
                    block.len()
                );
                break;
            }

            let take = (buf.len() - produced).min(samples_per_record - in_record);
            decode_le_slice(&block, in_record * width, &mut buf[produced..produced + take], width);
            produced += take;
            record += 1;
            in_record = 0;
        }

        self.sample_positions[signal] = start.saturating_add(produced as u64);
        Ok(produced)
    }

    /// Reads physical samples of `signal` into `buf`.
    ///
    /// Same cursor and end-of-data behaviour as [`read_digital`](Self::read_digital);
    /// each value is scaled with the signal's calibration.
    pub fn read_physical(&mut self, signal: usize, buf: &mut [f64]) -> Result<usize> {
        let mut digital = vec![0i32; buf.len()];
        let produced = self.read_digital(signal, &mut digital)?;

        let calibration = self.calibrations[signal];
        for (out, &value) in buf.iter_mut().zip(&digital[..produced]) {
            *out = calibration.to_physical(value);
        }
        Ok(produced)
    }

    /// Reads up to `count` digital samples of `signal` into a new vector
    ///
    /// # Examples
    ///
    /// ```rust
    /// use edfread::EdfReader;
    ///
    /// # edfread::doctest_utils::create_simple_test_file("reader_digital.edf")?;
    /// let mut reader = EdfReader::open("reader_digital.edf")?;
    /// let total = reader.number_of_samples(0)?;
    ///
    /// // Asking for more than remains is fine
    /// reader.set_position(0, total - 10)?;
    /// let tail = reader.read_digital_samples(0, 100)?;
    /// assert_eq!(tail.len(), 10);
    ///
    /// let nothing = reader.read_digital_samples(0, 100)?;
    /// assert!(nothing.is_empty());
    /// # std::fs::remove_file("reader_digital.edf").ok();
    /// # Ok::<(), edfread::EdfError>(())
    /// ```
    pub fn read_digital_samples(&mut self, signal: usize, count: usize) -> Result<Vec<i32>> {
        let len = self.buffer_len(signal, count)?;
        let mut samples = vec![0i32; len];
        let produced = self.read_digital(signal, &mut samples)?;
        samples.truncate(produced);
        Ok(samples)
    }

    /// Reads up to `count` physical samples of `signal` into a new vector
    pub fn read_physical_samples(&mut self, signal: usize, count: usize) -> Result<Vec<f64>> {
        let len = self.buffer_len(signal, count)?;
        let mut samples = vec![0f64; len];
        let produced = self.read_physical(signal, &mut samples)?;
        samples.truncate(produced);
        Ok(samples)
    }

    /// Number of complete data records, derived from the current source length
    pub fn number_of_data_records(&mut self) -> Result<u64> {
        let file_len = self.source_len()?;
        Ok(self.header.record_count(file_len))
    }

    /// Total number of samples of `signal` in the complete data records
    pub fn number_of_samples(&mut self, signal: usize) -> Result<u64> {
        self.check_signal(signal)?;
        let records = self.number_of_data_records()?;
        Ok(records * self.header.signals[signal].samples_per_record as u64)
    }

    /// Releases the underlying source.
    ///
    /// Later reads, seeks and size queries fail with `EdfError::ResourceClosed`.
    /// Closing again is a no-op. Dropping the reader releases the source too.
    pub fn close(&mut self) -> Result<()> {
        if let Some(source) = self.source.take() {
            drop(source);
            debug!("Reader closed");
        }
        Ok(())
    }

    fn check_signal(&self, signal: usize) -> Result<()> {
        if self.source.is_none() {
            return Err(EdfError::ResourceClosed);
        }
        if signal >= self.header.signal_count() {
            return Err(EdfError::InvalidSignalIndex(signal));
        }
        Ok(())
    }

    fn source_len(&mut self) -> Result<u64> {
        let source = self.source.as_mut().ok_or(EdfError::ResourceClosed)?;
        Ok(source.seek(SeekFrom::End(0))?)
    }

    /// 按剩余样本数限制分配大小
    fn buffer_len(&mut self, signal: usize, count: usize) -> Result<usize> {
        let available = self
            .number_of_samples(signal)?
            .saturating_sub(self.sample_positions[signal]);
        Ok((count as u64).min(available) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{build_file, FixtureSignal};
    use crate::types::FileVariant;
    use std::io::Cursor;

    /// 2 信号：每记录 [2, 1] 个样本，共 2 个记录
    fn small_file() -> Vec<u8> {
        build_file(
            FileVariant::Edf,
            &[FixtureSignal::new("A", 2), FixtureSignal::new("B", 1)],
            1.0,
            &[vec![10, 20, 30, 40], vec![100, 200]],
        )
    }

    fn small_reader() -> EdfReader<Cursor<Vec<u8>>> {
        EdfReader::from_reader(Cursor::new(small_file())).unwrap()
    }

    /// Read + Seek 源，读取到指定偏移之后的字节时报错
    struct FailingSource {
        inner: Cursor<Vec<u8>>,
        fail_from: u64,
    }

    impl Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.inner.position() >= self.fail_from {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }
            let allowed = (self.fail_from - self.inner.position()) as usize;
            let len = buf.len().min(allowed);
            self.inner.read(&mut buf[..len])
        }
    }

    impl Seek for FailingSource {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_end_to_end_small_file() {
        let mut reader = small_reader();
        assert_eq!(reader.number_of_data_records().unwrap(), 2);
        assert_eq!(reader.number_of_samples(0).unwrap(), 4);
        assert_eq!(reader.number_of_samples(1).unwrap(), 2);

        let mut a = [0i32; 4];
        assert_eq!(reader.read_digital(0, &mut a).unwrap(), 4);
        assert_eq!(a, [10, 20, 30, 40]);

        let mut b = [0i32; 2];
        assert_eq!(reader.read_digital(1, &mut b).unwrap(), 2);
        assert_eq!(b, [100, 200]);
    }

    #[test]
    fn test_read_into_buffer_offset() {
        let mut reader = small_reader();
        let mut buffer = [-1i32; 6];
        assert_eq!(reader.read_digital(0, &mut buffer[2..5]).unwrap(), 3);
        assert_eq!(buffer, [-1, -1, 10, 20, 30, -1]);
        assert_eq!(reader.position(0).unwrap(), 3);
    }

    #[test]
    fn test_set_position_mid_record() {
        let mut reader = small_reader();
        reader.set_position(0, 1).unwrap();
        assert_eq!(reader.read_digital_samples(0, 2).unwrap(), vec![20, 30]);
        assert_eq!(reader.position(0).unwrap(), 3);
        assert_eq!(reader.position(1).unwrap(), 0);
    }

    #[test]
    fn test_short_read_is_not_an_error() {
        let mut reader = small_reader();
        let mut buf = [0i32; 10];
        assert_eq!(reader.read_digital(1, &mut buf).unwrap(), 2);
        assert_eq!(reader.read_digital(1, &mut buf).unwrap(), 0);
        assert_eq!(reader.position(1).unwrap(), 2);

        reader.set_position(0, 1_000).unwrap();
        assert_eq!(reader.read_digital(0, &mut buf).unwrap(), 0);
        assert_eq!(reader.position(0).unwrap(), 1_000);
    }

    #[test]
    fn test_cursor_near_u64_max_reads_nothing() {
        let mut reader = small_reader();
        let mut buf = [0i32; 4];
        reader.set_position(0, u64::MAX - 1).unwrap();
        assert_eq!(reader.read_digital(0, &mut buf).unwrap(), 0);
        assert_eq!(reader.position(0).unwrap(), u64::MAX - 1);

        reader.set_position(1, u64::MAX).unwrap();
        assert_eq!(reader.read_physical(1, &mut [0.0; 4]).unwrap(), 0);
        assert!(reader.read_digital_samples(1, 4).unwrap().is_empty());
        assert_eq!(reader.position(1).unwrap(), u64::MAX);
    }

    #[test]
    fn test_zero_count_request() {
        let mut reader = small_reader();
        assert_eq!(reader.read_digital(0, &mut []).unwrap(), 0);
        assert_eq!(reader.position(0).unwrap(), 0);
    }

    #[test]
    fn test_trailing_partial_record_ignored() {
        let mut bytes = small_file();
        bytes.extend_from_slice(&[1, 0, 2, 0]); // 不完整的第三个记录
        let mut reader = EdfReader::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.number_of_data_records().unwrap(), 2);
        assert_eq!(reader.read_digital_samples(0, 10).unwrap(), vec![10, 20, 30, 40]);

        let mut buf = [0i32; 10];
        reader.rewind(0).unwrap();
        assert_eq!(reader.read_digital(0, &mut buf).unwrap(), 4);
    }

    #[test]
    fn test_physical_read_matches_calibration() {
        let signals = [FixtureSignal::new("A", 3).with_ranges((-100, 100), (-1.0, 1.0))];
        let bytes = build_file(FileVariant::Edf, &signals, 1.0, &[vec![-100, 0, 100]]);
        let mut reader = EdfReader::from_reader(Cursor::new(bytes)).unwrap();

        let mut buf = [0f64; 5];
        assert_eq!(reader.read_physical(0, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[-1.0, 0.0, 1.0]);
        assert_eq!(&buf[3..], &[0.0, 0.0]);
    }

    #[test]
    fn test_bdf_samples() {
        let signals = [FixtureSignal::new("A", 2).with_ranges((-8_388_608, 8_388_607), (-1.0, 1.0))];
        let values = vec![-8_388_608, -1, 1, 8_388_607];
        let bytes = build_file(FileVariant::Bdf, &signals, 1.0, &[values.clone()]);
        let mut reader = EdfReader::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.read_digital_samples(0, 4).unwrap(), values);
    }

    #[test]
    fn test_invalid_signal_index() {
        let mut reader = small_reader();
        assert!(matches!(reader.set_position(2, 0), Err(EdfError::InvalidSignalIndex(2))));
        assert!(matches!(reader.read_digital(5, &mut [0; 1]), Err(EdfError::InvalidSignalIndex(5))));
        assert!(matches!(reader.number_of_samples(2), Err(EdfError::InvalidSignalIndex(2))));
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_reads() {
        let mut reader = small_reader();
        reader.close().unwrap();
        reader.close().unwrap();
        assert!(reader.is_closed());

        assert!(matches!(reader.read_digital(0, &mut [0; 1]), Err(EdfError::ResourceClosed)));
        assert!(matches!(reader.set_position(0, 1), Err(EdfError::ResourceClosed)));
        assert!(matches!(reader.number_of_data_records(), Err(EdfError::ResourceClosed)));
        assert_eq!(reader.header().signal_count(), 2);
    }

    #[test]
    fn test_io_error_leaves_cursor_unchanged() {
        let bytes = small_file();
        // 允许读取头部和第一个记录
        let fail_from = 768 + 6;
        let source = FailingSource {
            inner: Cursor::new(bytes),
            fail_from,
        };
        let mut reader = EdfReader::from_reader(source).unwrap();

        let mut buf = [0i32; 4];
        let err = reader.read_digital(0, &mut buf).unwrap_err();
        assert!(matches!(err, EdfError::Io(_)));
        assert_eq!(reader.position(0).unwrap(), 0);

        // 第一个记录内的读取仍然成功
        assert_eq!(reader.read_digital(0, &mut buf[..2]).unwrap(), 2);
        assert_eq!(&buf[..2], &[10, 20]);
    }

    #[test]
    fn test_header_failure_aborts_open() {
        let mut bytes = small_file();
        bytes[0] = b'9';
        let result = EdfReader::from_reader(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(EdfError::Header(crate::HeaderError::UnknownVariant(_)))
        ));
    }
}
