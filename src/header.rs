//! Parsing of the fixed-layout ASCII header block.
//!
//! The header is a 256-byte fixed part followed by 256 bytes per signal. The
//! per-signal part is grouped by field: all labels first, then all
//! transducer types, and so on.

use std::io::Read;

use crate::error::{HeaderError, Result};
use crate::types::{EdfHeader, FileVariant, SignalParam};
use crate::utils::{field_string, field_text, parse_float_field, parse_int_field, read_fully};
use crate::{EDFLIB_MAXSIGNALS, EDF_FIXED_HEADER_SIZE, EDF_SIGNAL_HEADER_SIZE};

/// Width in bytes of each per-signal field, in file order
const SIGNAL_FIELD_WIDTHS: [usize; 10] = [16, 80, 8, 8, 8, 8, 8, 80, 8, 32];

// 字段在 SIGNAL_FIELD_WIDTHS 中的位置
const LABEL: usize = 0;
const TRANSDUCER: usize = 1;
const DIMENSION: usize = 2;
const PHYSICAL_MIN: usize = 3;
const PHYSICAL_MAX: usize = 4;
const DIGITAL_MIN: usize = 5;
const DIGITAL_MAX: usize = 6;
const PREFILTER: usize = 7;
const SAMPLES_PER_RECORD: usize = 8;
const RESERVED: usize = 9;

/// Reads and parses the header block from the start of `source`.
///
/// The fixed 256-byte part is read first; it tells how many signal header
/// bytes follow. A source that ends inside the header fails with
/// `HeaderError::LengthMismatch`.
pub fn read_header<R: Read + ?Sized>(source: &mut R) -> Result<EdfHeader> {
    let mut bytes = vec![0u8; EDF_FIXED_HEADER_SIZE];
    let got = read_fully(source, &mut bytes)?;
    if got < EDF_FIXED_HEADER_SIZE {
        return Err(HeaderError::LengthMismatch {
            expected: EDF_FIXED_HEADER_SIZE,
            found: got,
        }
        .into());
    }

    let header_size = fixed_header_size(&bytes)?;
    bytes.resize(header_size, 0);
    let got = read_fully(source, &mut bytes[EDF_FIXED_HEADER_SIZE..])?;
    if EDF_FIXED_HEADER_SIZE + got < header_size {
        return Err(HeaderError::LengthMismatch {
            expected: header_size,
            found: EDF_FIXED_HEADER_SIZE + got,
        }
        .into());
    }

    Ok(parse_header(&bytes)?)
}

/// Validates the fixed part of a header and returns the total header length.
///
/// Checks the variant marker, the signal count and that the declared header
/// length equals `256 + 256 * signal_count`.
pub fn fixed_header_size(bytes: &[u8]) -> std::result::Result<usize, HeaderError> {
    if bytes.len() < EDF_FIXED_HEADER_SIZE {
        return Err(HeaderError::LengthMismatch {
            expected: EDF_FIXED_HEADER_SIZE,
            found: bytes.len(),
        });
    }

    detect_variant(bytes)?;

    let signal_count = parse_signal_count(bytes)?;
    let expected = EDF_FIXED_HEADER_SIZE + signal_count * EDF_SIGNAL_HEADER_SIZE;

    let text = field_text(bytes, 184, 8, "header size")?;
    let declared = parse_int_field(text, "header size")?;
    if declared < 0 {
        return Err(HeaderError::malformed("header size", text));
    }
    if declared as usize != expected {
        return Err(HeaderError::LengthMismatch {
            expected,
            found: declared as usize,
        });
    }

    Ok(expected)
}

/// Parses a complete header block into an [`EdfHeader`].
///
/// `bytes` must hold at least the whole header; anything after it is ignored.
/// Parsing is all-or-nothing.
///
/// # Examples
///
/// ```rust
/// use edfread::doctest_utils::{build_header, FixtureSignal};
/// use edfread::{parse_header, FileVariant};
///
/// let bytes = build_header(FileVariant::Edf, &[FixtureSignal::new("EEG Fz", 4)], 1.0, 2);
/// let header = parse_header(&bytes)?;
///
/// assert_eq!(header.signal_count(), 1);
/// assert_eq!(header.header_size, 512);
/// assert_eq!(header.signals[0].label, "EEG Fz");
/// # Ok::<(), edfread::HeaderError>(())
/// ```
pub fn parse_header(bytes: &[u8]) -> std::result::Result<EdfHeader, HeaderError> {
    let header_size = fixed_header_size(bytes)?;
    if bytes.len() < header_size {
        return Err(HeaderError::LengthMismatch {
            expected: header_size,
            found: bytes.len(),
        });
    }

    let file_variant = detect_variant(bytes)?;
    let version = match file_variant {
        FileVariant::Edf => field_string(bytes, 0, 8),
        FileVariant::Bdf => field_string(bytes, 1, 7),
    };

    // 描述性字段按文本宽松读取，非 ASCII 字节不视为错误
    let patient_id = field_string(bytes, 8, 80);
    let recording_id = field_string(bytes, 88, 80);
    let start_date = field_string(bytes, 168, 8);
    let start_time = field_string(bytes, 176, 8);
    let reserved = field_string(bytes, 192, 44);

    let text = field_text(bytes, 236, 8, "number of data records")?;
    let datarecords_in_header = parse_int_field(text, "number of data records")?;
    if datarecords_in_header < -1 {
        return Err(HeaderError::malformed("number of data records", text));
    }

    // 记录时长是必填字段，不存在缺省值
    let text = field_text(bytes, 244, 8, "data record duration")?;
    let datarecord_duration = parse_float_field(text, "data record duration")?;
    if datarecord_duration < 0.0 {
        return Err(HeaderError::malformed("data record duration", text));
    }

    let signal_count = parse_signal_count(bytes)?;
    let signals = parse_signals(&bytes[EDF_FIXED_HEADER_SIZE..header_size], signal_count)?;

    Ok(EdfHeader {
        file_variant,
        version,
        patient_id,
        recording_id,
        start_date,
        start_time,
        header_size,
        reserved,
        datarecords_in_header,
        datarecord_duration,
        signals,
    })
}

fn detect_variant(bytes: &[u8]) -> std::result::Result<FileVariant, HeaderError> {
    if bytes[0] == 0xFF && &bytes[1..8] == b"BIOSEMI" {
        return Ok(FileVariant::Bdf);
    }
    match std::str::from_utf8(&bytes[0..8]) {
        Ok(text) if text.trim_end() == "0" => Ok(FileVariant::Edf),
        _ => Err(HeaderError::UnknownVariant(
            String::from_utf8_lossy(&bytes[0..8]).into_owned(),
        )),
    }
}

fn parse_signal_count(bytes: &[u8]) -> std::result::Result<usize, HeaderError> {
    let text = field_text(bytes, 252, 4, "number of signals")?;
    let count = parse_int_field(text, "number of signals")?;
    if count < 1 || count as usize > EDFLIB_MAXSIGNALS {
        return Err(HeaderError::malformed("number of signals", text));
    }
    Ok(count as usize)
}

/// Byte offset of field `field` for signal `signal` within the signal header block
fn signal_field_start(signal_count: usize, field: usize, signal: usize) -> usize {
    let preceding: usize = SIGNAL_FIELD_WIDTHS[..field].iter().sum();
    preceding * signal_count + signal * SIGNAL_FIELD_WIDTHS[field]
}

fn parse_signals(
    block: &[u8],
    signal_count: usize,
) -> std::result::Result<Vec<SignalParam>, HeaderError> {
    let field = |field: usize, signal: usize, name: &str| {
        let start = signal_field_start(signal_count, field, signal);
        field_text(block, start, SIGNAL_FIELD_WIDTHS[field], name)
    };
    let free_text = |field: usize, signal: usize| {
        let start = signal_field_start(signal_count, field, signal);
        field_string(block, start, SIGNAL_FIELD_WIDTHS[field])
    };

    let mut signals = Vec::with_capacity(signal_count);
    for i in 0..signal_count {
        let physical_min = parse_float_field(field(PHYSICAL_MIN, i, "physical minimum")?, "physical minimum")?;
        let physical_max = parse_float_field(field(PHYSICAL_MAX, i, "physical maximum")?, "physical maximum")?;
        let digital_min = parse_digital(field(DIGITAL_MIN, i, "digital minimum")?, "digital minimum")?;
        let digital_max = parse_digital(field(DIGITAL_MAX, i, "digital maximum")?, "digital maximum")?;

        let text = field(SAMPLES_PER_RECORD, i, "samples per record")?;
        let samples_per_record = parse_int_field(text, "samples per record")?;
        if samples_per_record < 1 {
            return Err(HeaderError::malformed("samples per record", text));
        }

        // 验证参数
        if digital_min >= digital_max {
            return Err(HeaderError::DegenerateCalibration {
                signal: i,
                reason: format!("digital minimum {} is not below digital maximum {}", digital_min, digital_max),
            });
        }
        if physical_min == physical_max {
            return Err(HeaderError::DegenerateCalibration {
                signal: i,
                reason: format!("physical minimum equals physical maximum ({})", physical_min),
            });
        }

        signals.push(SignalParam {
            label: free_text(LABEL, i),
            transducer: free_text(TRANSDUCER, i),
            physical_dimension: free_text(DIMENSION, i),
            physical_min,
            physical_max,
            digital_min,
            digital_max,
            prefilter: free_text(PREFILTER, i),
            samples_per_record: samples_per_record as usize,
            reserved: free_text(RESERVED, i),
        });
    }

    Ok(signals)
}

fn parse_digital(text: &str, name: &str) -> std::result::Result<i32, HeaderError> {
    let value = parse_int_field(text, name)?;
    i32::try_from(value).map_err(|_| HeaderError::malformed(name, text))
}
