// Internal utilities for documentation tests and integration tests.
// Builds raw EDF/BDF bytes field by field so the reader can be exercised
// against files with exactly known contents.

use std::path::Path;

use crate::types::FileVariant;
use crate::Result;

/// Field values of one signal in a generated header
#[derive(Debug, Clone)]
pub struct FixtureSignal {
    pub label: String,
    pub transducer: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefilter: String,
    pub samples_per_record: usize,
}

impl FixtureSignal {
    /// A 16-bit signal spanning ±200 uV
    pub fn new(label: &str, samples_per_record: usize) -> Self {
        FixtureSignal {
            label: label.to_string(),
            transducer: String::new(),
            physical_dimension: "uV".to_string(),
            physical_min: -200.0,
            physical_max: 200.0,
            digital_min: -32768,
            digital_max: 32767,
            prefilter: String::new(),
            samples_per_record,
        }
    }

    pub fn with_ranges(mut self, digital: (i32, i32), physical: (f64, f64)) -> Self {
        self.digital_min = digital.0;
        self.digital_max = digital.1;
        self.physical_min = physical.0;
        self.physical_max = physical.1;
        self
    }
}

fn push_field(out: &mut Vec<u8>, value: &str, width: usize) {
    let mut field = value.as_bytes().to_vec();
    field.resize(width, b' ');
    out.extend_from_slice(&field[..width]);
}

/// Builds a header block with the given signals, record duration and declared record count
pub fn build_header(
    variant: FileVariant,
    signals: &[FixtureSignal],
    record_duration: f64,
    records: i64,
) -> Vec<u8> {
    let ns = signals.len();
    let mut out = Vec::with_capacity(256 + 256 * ns);

    match variant {
        FileVariant::Edf => push_field(&mut out, "0", 8),
        FileVariant::Bdf => {
            out.push(0xFF);
            push_field(&mut out, "BIOSEMI", 7);
        }
    }
    push_field(&mut out, "X X X X", 80);
    push_field(&mut out, "Startdate X X X X", 80);
    push_field(&mut out, "01.01.21", 8);
    push_field(&mut out, "10.00.00", 8);
    push_field(&mut out, &(256 + 256 * ns).to_string(), 8);
    let reserved = match variant {
        FileVariant::Edf => "",
        FileVariant::Bdf => "24BIT",
    };
    push_field(&mut out, reserved, 44);
    push_field(&mut out, &records.to_string(), 8);
    push_field(&mut out, &record_duration.to_string(), 8);
    push_field(&mut out, &ns.to_string(), 4);

    for s in signals {
        push_field(&mut out, &s.label, 16);
    }
    for s in signals {
        push_field(&mut out, &s.transducer, 80);
    }
    for s in signals {
        push_field(&mut out, &s.physical_dimension, 8);
    }
    for s in signals {
        push_field(&mut out, &s.physical_min.to_string(), 8);
    }
    for s in signals {
        push_field(&mut out, &s.physical_max.to_string(), 8);
    }
    for s in signals {
        push_field(&mut out, &s.digital_min.to_string(), 8);
    }
    for s in signals {
        push_field(&mut out, &s.digital_max.to_string(), 8);
    }
    for s in signals {
        push_field(&mut out, &s.prefilter, 80);
    }
    for s in signals {
        push_field(&mut out, &s.samples_per_record.to_string(), 8);
    }
    for _ in signals {
        push_field(&mut out, "", 32);
    }

    out
}

/// Builds a complete file from per-channel sample sequences.
///
/// `channel_samples[i]` holds every sample of signal `i`; the record count is
/// taken from the first signal and all signals must cover the same number of
/// records.
pub fn build_file(
    variant: FileVariant,
    signals: &[FixtureSignal],
    record_duration: f64,
    channel_samples: &[Vec<i32>],
) -> Vec<u8> {
    assert_eq!(signals.len(), channel_samples.len(), "one sample vector per signal");
    let records = channel_samples[0].len() / signals[0].samples_per_record;
    let width = variant.bytes_per_sample();

    let mut out = build_header(variant, signals, record_duration, records as i64);
    for record in 0..records {
        for (signal, samples) in signals.iter().zip(channel_samples) {
            let spr = signal.samples_per_record;
            assert_eq!(samples.len(), records * spr, "signal {} has a partial record", signal.label);
            for &value in &samples[record * spr..(record + 1) * spr] {
                out.extend_from_slice(&value.to_le_bytes()[..width]);
            }
        }
    }
    out
}

/// Writes [`build_file`] output to `path`
pub fn write_file<P: AsRef<Path>>(
    path: P,
    variant: FileVariant,
    signals: &[FixtureSignal],
    record_duration: f64,
    channel_samples: &[Vec<i32>],
) -> Result<()> {
    std::fs::write(path, build_file(variant, signals, record_duration, channel_samples))?;
    Ok(())
}

/// Creates a simple one-channel EDF file: 256 Hz, 10 one-second records of a ramp
pub fn create_simple_test_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let samples: Vec<i32> = (0..2560).map(|i| (i % 512) * 64 - 16384).collect();
    write_file(
        path,
        FileVariant::Edf,
        &[FixtureSignal::new("EEG Fp1", 256)],
        1.0,
        &[samples],
    )
}

/// Creates a two-channel EDF file with different sample rates (256 Hz and 64 Hz, 4 records)
pub fn create_multi_channel_test_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let eeg: Vec<i32> = (0..1024).map(|i| i * 10).collect();
    let resp: Vec<i32> = (0..256).map(|i| -i).collect();
    let mut resp_signal = FixtureSignal::new("Resp", 64).with_ranges((-2048, 2047), (-5.0, 5.0));
    resp_signal.physical_dimension = "mV".to_string();
    write_file(
        path,
        FileVariant::Edf,
        &[FixtureSignal::new("EEG C3", 256), resp_signal],
        1.0,
        &[eeg, resp],
    )
}
