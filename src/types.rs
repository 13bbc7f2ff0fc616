use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::calibration::Calibration;

/// Sample encoding of a file, fixed by the header's version field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileVariant {
    /// European Data Format, 16-bit samples
    Edf,
    /// BioSemi Data Format, 24-bit samples
    Bdf,
}

impl FileVariant {
    /// Width of one raw sample in bytes
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            FileVariant::Edf => 2,
            FileVariant::Bdf => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalParam {
    pub label: String,
    pub transducer: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefilter: String,
    pub samples_per_record: usize,
    pub reserved: String,
}

impl SignalParam {
    /// Linear digital-to-physical mapping for this signal
    pub fn calibration(&self) -> Calibration {
        Calibration::from_signal(self)
    }

    /// 将数字值转换为物理值
    pub fn to_physical(&self, digital_value: i32) -> f64 {
        self.calibration().to_physical(digital_value)
    }

    /// 将物理值转换为数字值
    pub fn to_digital(&self, physical_value: f64) -> i32 {
        self.calibration().to_digital(physical_value)
    }

    /// EDF+ and BDF+ store annotations in a pseudo-signal with a reserved label
    pub fn is_annotation(&self) -> bool {
        self.label == "EDF Annotations" || self.label == "BDF Annotations"
    }
}

/// Subfields of an EDF+ patient identification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientInfo {
    pub code: String,
    pub sex: String,
    pub birthdate: String,
    pub name: String,
    pub additional: String,
}

/// Subfields of an EDF+ recording identification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingInfo {
    pub admin_code: String,
    pub technician: String,
    pub equipment: String,
    pub additional: String,
}

/// Parsed header block of an EDF or BDF file.
///
/// Built once when a file is opened and never modified afterwards. Channel
/// geometry (`record_size`, `record_count`, ...) is derived from the
/// per-signal fields rather than stored.
#[derive(Debug, Clone, PartialEq)]
pub struct EdfHeader {
    pub file_variant: FileVariant,
    pub version: String,
    pub patient_id: String,
    pub recording_id: String,
    /// 原始日期字段 "dd.mm.yy"
    pub start_date: String,
    /// 原始时间字段 "hh.mm.ss"
    pub start_time: String,
    pub header_size: usize,
    pub reserved: String,
    /// Record count as declared in the header, `-1` while a recording is in progress
    pub datarecords_in_header: i64,
    /// Duration of one data record in seconds
    pub datarecord_duration: f64,
    pub signals: Vec<SignalParam>,
}

impl EdfHeader {
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.file_variant.bytes_per_sample()
    }

    /// Total number of samples (all signals) in one data record
    pub fn record_width_in_samples(&self) -> usize {
        self.signals.iter().map(|s| s.samples_per_record).sum()
    }

    /// Size of one data record in bytes
    pub fn record_size(&self) -> usize {
        self.record_width_in_samples() * self.bytes_per_sample()
    }

    /// Number of complete data records in a file of `file_len` bytes.
    ///
    /// A trailing partial record is not counted.
    pub fn record_count(&self, file_len: u64) -> u64 {
        let data_len = file_len.saturating_sub(self.header_size as u64);
        data_len / self.record_size() as u64
    }

    /// Samples per second of `signal`, `None` for zero-duration records
    pub fn sample_rate(&self, signal: usize) -> Option<f64> {
        let param = self.signals.get(signal)?;
        if self.datarecord_duration > 0.0 {
            Some(param.samples_per_record as f64 / self.datarecord_duration)
        } else {
            None
        }
    }

    /// Length in seconds covered by `record_count` data records
    pub fn file_duration_seconds(&self, record_count: u64) -> f64 {
        self.datarecord_duration * record_count as f64
    }

    /// Converts a digital value of `signal` to its physical value
    ///
    /// # Panics
    ///
    /// Panics if `signal` is out of range.
    pub fn to_physical(&self, signal: usize, digital_value: i32) -> f64 {
        self.signals[signal].to_physical(digital_value)
    }

    /// Recording start, `None` if the date or time field is not in `dd.mm.yy` / `hh.mm.ss` form
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        let date = parse_dotted_triplet(&self.start_date)?;
        let time = parse_dotted_triplet(&self.start_time)?;

        // EDF 的两位年份以 1985 为界
        let year = if date.2 > 84 { 1900 + date.2 } else { 2000 + date.2 };
        let date = NaiveDate::from_ymd_opt(year as i32, date.1, date.0)?;
        let time = NaiveTime::from_hms_opt(time.0, time.1, time.2)?;
        Some(NaiveDateTime::new(date, time))
    }

    /// Splits the patient identification into its EDF+ subfields.
    ///
    /// Plain EDF files put free text here, in which case the words simply fill
    /// the subfields in order.
    pub fn patient_info(&self) -> PatientInfo {
        // EDF+ 患者字段格式: "patientcode sex birthdate patientname additional_info"
        let parts: Vec<&str> = self.patient_id.split_whitespace().collect();
        PatientInfo {
            code: parts.first().unwrap_or(&"").to_string(),
            sex: parts.get(1).unwrap_or(&"").to_string(),
            birthdate: parts.get(2).unwrap_or(&"").to_string(),
            name: parts.get(3).unwrap_or(&"").to_string(),
            additional: parts.get(4..).map(|s| s.join(" ")).unwrap_or_default(),
        }
    }

    /// Splits the recording identification into its EDF+ subfields
    pub fn recording_info(&self) -> RecordingInfo {
        // EDF+ 记录字段格式: "Startdate dd-MMM-yyyy admincode technician equipment additional_info"
        let parts: Vec<&str> = self.recording_id.split_whitespace().collect();
        let skip = if parts.first() == Some(&"Startdate") { 2 } else { 0 };
        RecordingInfo {
            admin_code: parts.get(skip).unwrap_or(&"").to_string(),
            technician: parts.get(skip + 1).unwrap_or(&"").to_string(),
            equipment: parts.get(skip + 2).unwrap_or(&"").to_string(),
            additional: parts.get(skip + 3..).map(|s| s.join(" ")).unwrap_or_default(),
        }
    }
}

fn parse_dotted_triplet(s: &str) -> Option<(u32, u32, u32)> {
    let mut parts = s.trim().split('.');
    let a = parts.next()?.trim().parse().ok()?;
    let b = parts.next()?.trim().parse().ok()?;
    let c = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((a, b, c))
}
