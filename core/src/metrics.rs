//! Host metrics sampling into a fixed-capacity circular history.
//!
//! Sampling reads `/proc` on Linux-style systems; where `/proc` is missing
//! the sampler degrades to zeroed samples so the payload stays well-formed.
//! CPU utilization needs two observations of `/proc/stat`, so the first
//! sample after startup reports 0.

use crate::snapshot::SystemPayload;
use crate::snapshot::SystemSample;
use chrono::Utc;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;

/// Fixed-capacity circular buffer. The newest element is always at the
/// back; capacity never grows.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.buf.back()
    }

    /// Oldest-to-newest iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CpuTimes {
    busy: u64,
    total: u64,
}

/// Stateful sampler: keeps the previous CPU observation and the ring of
/// samples. Owned by the system collector; one instance per daemon.
#[derive(Debug)]
pub struct SystemSampler {
    proc_root: PathBuf,
    disk_path: PathBuf,
    prev_cpu: Option<CpuTimes>,
    history: RingBuffer<SystemSample>,
}

impl SystemSampler {
    pub fn new(capacity: usize) -> Self {
        Self::with_roots(capacity, PathBuf::from("/proc"), PathBuf::from("/"))
    }

    /// `proc_root` is parameterized so tests can point at a fixture tree.
    pub fn with_roots(capacity: usize, proc_root: PathBuf, disk_path: PathBuf) -> Self {
        Self {
            proc_root,
            disk_path,
            prev_cpu: None,
            history: RingBuffer::new(capacity),
        }
    }

    /// Reload history from a previously persisted payload, keeping at most
    /// the buffer capacity of trailing samples. Best-effort on restart.
    pub fn restore(&mut self, payload: &SystemPayload) {
        for sample in &payload.samples {
            self.history.push(*sample);
        }
    }

    /// Take one sample, append it to the history, and return the whole
    /// history as a payload ready for persistence.
    pub fn sample(&mut self) -> SystemPayload {
        let sample = self.sample_once();
        self.history.push(sample);
        SystemPayload {
            samples: self.history.iter().copied().collect(),
        }
    }

    fn sample_once(&mut self) -> SystemSample {
        let cpu_percent = self.cpu_percent();
        SystemSample {
            timestamp: Utc::now(),
            cpu_percent,
            ram_percent: self.ram_percent(),
            disk_percent: disk_percent(&self.disk_path),
            load_avg: self.load_avg(),
        }
    }

    fn cpu_percent(&mut self) -> f64 {
        let Some(current) = read_cpu_times(&self.proc_root) else {
            return 0.0;
        };
        let previous = self.prev_cpu.replace(current);
        let Some(previous) = previous else {
            return 0.0;
        };
        let total = current.total.saturating_sub(previous.total);
        let busy = current.busy.saturating_sub(previous.busy);
        if total == 0 {
            return 0.0;
        }
        (busy as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    fn ram_percent(&self) -> f64 {
        let Ok(contents) = std::fs::read_to_string(self.proc_root.join("meminfo")) else {
            return 0.0;
        };
        let field = |name: &str| -> Option<f64> {
            contents
                .lines()
                .find(|line| line.starts_with(name))?
                .split_whitespace()
                .nth(1)?
                .parse::<f64>()
                .ok()
        };
        let (Some(total), Some(available)) = (field("MemTotal:"), field("MemAvailable:")) else {
            return 0.0;
        };
        if total <= 0.0 {
            return 0.0;
        }
        ((total - available) / total * 100.0).clamp(0.0, 100.0)
    }

    fn load_avg(&self) -> f64 {
        std::fs::read_to_string(self.proc_root.join("loadavg"))
            .ok()
            .and_then(|contents| {
                contents
                    .split_whitespace()
                    .next()
                    .and_then(|first| first.parse::<f64>().ok())
            })
            .unwrap_or(0.0)
    }
}

fn read_cpu_times(proc_root: &Path) -> Option<CpuTimes> {
    let contents = std::fs::read_to_string(proc_root.join("stat")).ok()?;
    let line = contents.lines().find(|line| line.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|field| field.parse().ok())
        .collect();
    if fields.len() < 4 {
        return None;
    }
    let total: u64 = fields.iter().sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTimes {
        busy: total.saturating_sub(idle),
        total,
    })
}

#[cfg(unix)]
fn disk_percent(path: &Path) -> f64 {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return 0.0;
    };
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 || stat.f_blocks == 0 {
        return 0.0;
    }
    let used = stat.f_blocks.saturating_sub(stat.f_bavail);
    (used as f64 / stat.f_blocks as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(not(unix))]
fn disk_percent(_path: &Path) -> f64 {
    0.0
}
