//! Whole-channel loading with an optional sample window and decimation.
//!
//! Display front-ends want every channel as a plain `Vec<f64>`, bounded in
//! size. [`load_channels`] reads each signal through an [`EdfReader`] in
//! fixed-size chunks and keeps every n-th sample so that no channel exceeds
//! [`LoadOptions::max_samples_per_channel`].

use std::io::{Read, Seek};
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::reader::EdfReader;

/// Tunables for [`load_channels`] and [`load_channel`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// First sample to load, per channel (default: 0)
    /// Clamped to the channel's sample count
    pub start_sample: u64,

    /// Number of samples to load from `start_sample`, `None` for all remaining (default: None)
    pub window: Option<u64>,

    /// Physical samples requested per read call (default: 4096)
    pub chunk_samples: usize,

    /// Upper bound on the loaded length of each channel (default: 1_000_000)
    /// Longer windows are decimated by the smallest integer factor that fits
    pub max_samples_per_channel: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            start_sample: 0,
            window: None,
            chunk_samples: 4096,
            max_samples_per_channel: 1_000_000,
        }
    }
}

/// One loaded channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelData {
    pub label: String,
    pub physical_dimension: String,
    /// Physical values after decimation
    pub samples: Vec<f64>,
    /// Effective rate of `samples` in Hz, `None` for zero-duration records
    pub sample_rate: Option<f64>,
    /// Every `decimation`-th sample of the window was kept
    pub decimation: usize,
}

/// Smallest factor that brings `length` samples under `max_samples`
pub fn decimation_factor(length: u64, max_samples: usize) -> usize {
    let max = max_samples.max(1) as u64;
    (((length + max - 1) / max).max(1)) as usize
}

/// Loads one signal according to `options`.
///
/// Moves the signal's cursor; other signals are untouched.
pub fn load_channel<R: Read + Seek>(
    reader: &mut EdfReader<R>,
    signal: usize,
    options: &LoadOptions,
) -> Result<ChannelData> {
    let total = reader.number_of_samples(signal)?;

    // 1. 计算实际起点和长度
    let start = options.start_sample.min(total);
    let length = match options.window {
        Some(window) => window.min(total - start),
        None => total - start,
    };

    // 2. 计算抽样因子 & 输出长度
    let decimation = decimation_factor(length, options.max_samples_per_channel);
    let out_len = ((length + decimation as u64 - 1) / decimation as u64) as usize;

    // 3. 按块读取物理样本，并仅取每 decimation 个样本中的第一个
    let mut samples = Vec::with_capacity(out_len);
    let mut chunk = vec![0f64; options.chunk_samples.max(1)];
    reader.set_position(signal, start)?;

    let mut read_count = 0u64;
    while read_count < length {
        let want = (chunk.len() as u64).min(length - read_count) as usize;
        let got = reader.read_physical(signal, &mut chunk[..want])?;
        if got == 0 {
            break;
        }
        for (i, &value) in chunk[..got].iter().enumerate() {
            if (read_count + i as u64) % decimation as u64 == 0 {
                samples.push(value);
            }
        }
        read_count += got as u64;
    }

    // 4. 通道名称和采样率
    let header = reader.header();
    let param = &header.signals[signal];
    let label = if param.label.is_empty() {
        format!("CH{}", signal + 1)
    } else {
        param.label.clone()
    };
    let sample_rate = header.sample_rate(signal).map(|rate| rate / decimation as f64);

    debug!(
        "Loaded {} ({} of {} samples, decimation {})",
        label,
        samples.len(),
        total,
        decimation
    );

    Ok(ChannelData {
        label,
        physical_dimension: param.physical_dimension.clone(),
        samples,
        sample_rate,
        decimation,
    })
}

/// Opens `path` and loads every signal according to `options`.
///
/// The file is closed before returning, on success and on error.
///
/// # Examples
///
/// ```rust
/// use edfread::{load_channels, LoadOptions};
///
/// # edfread::doctest_utils::create_multi_channel_test_file("loader_doc.edf")?;
/// let options = LoadOptions {
///     max_samples_per_channel: 300,
///     ..LoadOptions::default()
/// };
/// let channels = load_channels("loader_doc.edf", &options)?;
///
/// // 1024 EEG samples are decimated by 4, the 256 respiration samples fit as is
/// assert_eq!(channels[0].samples.len(), 256);
/// assert_eq!(channels[0].sample_rate, Some(64.0));
/// assert_eq!(channels[1].decimation, 1);
/// # std::fs::remove_file("loader_doc.edf").ok();
/// # Ok::<(), edfread::EdfError>(())
/// ```
pub fn load_channels<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Vec<ChannelData>> {
    let mut reader = EdfReader::open(path)?;
    let result = (0..reader.header().signal_count())
        .map(|signal| load_channel(&mut reader, signal, options))
        .collect::<Result<Vec<_>>>();
    reader.close()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{build_file, FixtureSignal};
    use crate::types::FileVariant;
    use std::io::Cursor;

    fn ramp_reader(len: i32) -> EdfReader<Cursor<Vec<u8>>> {
        // 数字值 == 物理值
        let signal = FixtureSignal::new("", 10).with_ranges((0, 8192), (0.0, 8192.0));
        let bytes = build_file(FileVariant::Edf, &[signal], 0.5, &[(0..len).collect()]);
        EdfReader::from_reader(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_decimation_factor() {
        assert_eq!(decimation_factor(0, 100), 1);
        assert_eq!(decimation_factor(100, 100), 1);
        assert_eq!(decimation_factor(101, 100), 2);
        assert_eq!(decimation_factor(1_000, 100), 10);
    }

    #[test]
    fn test_full_load_defaults() {
        let mut reader = ramp_reader(50);
        let channel = load_channel(&mut reader, 0, &LoadOptions::default()).unwrap();
        assert_eq!(channel.samples.len(), 50);
        assert_eq!(channel.samples[49], 49.0);
        assert_eq!(channel.label, "CH1");
        assert_eq!(channel.decimation, 1);
        assert_eq!(channel.sample_rate, Some(20.0));
    }

    #[test]
    fn test_window_and_small_chunks() {
        let mut reader = ramp_reader(100);
        let options = LoadOptions {
            start_sample: 15,
            window: Some(20),
            chunk_samples: 3,
            ..LoadOptions::default()
        };
        let channel = load_channel(&mut reader, 0, &options).unwrap();
        let expected: Vec<f64> = (15..35).map(|v| v as f64).collect();
        assert_eq!(channel.samples, expected);
    }

    #[test]
    fn test_decimated_window() {
        let mut reader = ramp_reader(100);
        let options = LoadOptions {
            start_sample: 5,
            max_samples_per_channel: 30,
            chunk_samples: 7,
            ..LoadOptions::default()
        };
        let channel = load_channel(&mut reader, 0, &options).unwrap();
        // 95 个样本 → 因子 4 → 24 个输出
        assert_eq!(channel.decimation, 4);
        assert_eq!(channel.samples.len(), 24);
        assert_eq!(channel.samples[0], 5.0);
        assert_eq!(channel.samples[1], 9.0);
        assert_eq!(channel.sample_rate, Some(5.0));
    }

    #[test]
    fn test_start_beyond_end_clamps() {
        let mut reader = ramp_reader(20);
        let options = LoadOptions {
            start_sample: 1_000,
            window: Some(10),
            ..LoadOptions::default()
        };
        let channel = load_channel(&mut reader, 0, &options).unwrap();
        assert!(channel.samples.is_empty());
    }
}
