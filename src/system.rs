//! Board identity and CPU health probes.
//!
//! Parsing is separated from file access so tests run on captured text.

use std::fs;
use std::io;

use crate::board::ProfileError;

const CPUINFO_PATH: &str = "/proc/cpuinfo";
const STAT_PATH: &str = "/proc/stat";
const THERMAL_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";
const CPUFREQ_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq";

/// Identity fields probed from `/proc/cpuinfo`. The revision string is the
/// detection key for the board profile; hardware and serial are
/// informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardIdentity {
    pub revision: String,
    pub hardware: Option<String>,
    pub serial: Option<String>,
}

impl BoardIdentity {
    pub fn detect() -> Result<Self, ProfileError> {
        Self::from_cpuinfo(&fs::read_to_string(CPUINFO_PATH)?)
    }

    pub fn from_cpuinfo(text: &str) -> Result<Self, ProfileError> {
        let revision = field(text, "revision").ok_or(ProfileError::MissingRevision)?;
        Ok(Self {
            revision: revision.to_string(),
            hardware: field(text, "hardware").map(str::to_string),
            serial: field(text, "serial").map(str::to_string),
        })
    }
}

fn field<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case(key) {
            let value = value.trim();
            (!value.is_empty()).then_some(value)
        } else {
            None
        }
    })
}

/// CPU temperature in degrees Celsius, from the thermal zone's
/// millidegree reading.
pub fn cpu_temperature() -> io::Result<f64> {
    let raw = fs::read_to_string(THERMAL_PATH)?;
    let millis: f64 = raw
        .trim()
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "thermal reading not numeric"))?;
    Ok(millis / 1000.0)
}

/// Current CPU frequency in kHz.
pub fn cpu_frequency_khz() -> io::Result<u64> {
    let raw = fs::read_to_string(CPUFREQ_PATH)?;
    raw.trim()
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "cpufreq reading not numeric"))
}

/// CPU usage between two `/proc/stat` samples. The first sample only
/// establishes the baseline.
#[derive(Debug, Default)]
pub struct CpuLoadSampler {
    last: Option<(u64, u64)>,
}

impl CpuLoadSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self) -> io::Result<Option<f64>> {
        Ok(self.sample_text(&fs::read_to_string(STAT_PATH)?))
    }

    /// Usage percentage since the previous sample, `None` on the first
    /// call or when no time has passed.
    pub fn sample_text(&mut self, stat: &str) -> Option<f64> {
        let line = stat.lines().find(|line| line.starts_with("cpu "))?;
        let mut fields = line.split_whitespace().skip(1);
        let user: u64 = fields.next()?.parse().ok()?;
        let _nice: u64 = fields.next()?.parse().ok()?;
        let system: u64 = fields.next()?.parse().ok()?;
        let idle: u64 = fields.next()?.parse().ok()?;

        let used = user + system;
        let previous = self.last.replace((used, idle));
        let (last_used, last_idle) = previous?;
        let delta_used = used.saturating_sub(last_used);
        let delta_idle = idle.saturating_sub(last_idle);
        if delta_used + delta_idle == 0 {
            return None;
        }
        Some(delta_used as f64 / (delta_used + delta_idle) as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPUINFO: &str = "\
processor\t: 0
model name\t: ARMv7 Processor rev 4 (v7l)
Hardware\t: BCM2835
Revision\t: a02082
Serial\t\t: 00000000abcdef01
";

    #[test]
    fn identity_fields_are_parsed() {
        let identity = BoardIdentity::from_cpuinfo(CPUINFO).unwrap();
        assert_eq!(identity.revision, "a02082");
        assert_eq!(identity.hardware.as_deref(), Some("BCM2835"));
        assert_eq!(identity.serial.as_deref(), Some("00000000abcdef01"));
    }

    #[test]
    fn missing_revision_is_an_error() {
        assert!(matches!(
            BoardIdentity::from_cpuinfo("processor : 0\n"),
            Err(ProfileError::MissingRevision)
        ));
    }

    #[test]
    fn load_sampler_needs_two_samples() {
        let mut sampler = CpuLoadSampler::new();
        let first = "cpu  100 0 100 800 0 0 0 0 0 0\n";
        let second = "cpu  150 0 150 900 0 0 0 0 0 0\n";
        assert_eq!(sampler.sample_text(first), None);
        let usage = sampler.sample_text(second).unwrap();
        // 100 used over 200 total ticks.
        assert!((usage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn load_sampler_handles_idle_machine() {
        let mut sampler = CpuLoadSampler::new();
        let stat = "cpu  100 0 100 800 0 0 0 0 0 0\n";
        assert_eq!(sampler.sample_text(stat), None);
        assert_eq!(sampler.sample_text(stat), None);
    }
}
