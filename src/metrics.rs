// Operation timing
//
// The monitor is owned by whoever drives the tools and passed down
// explicitly; nothing here is global.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: String,
    pub duration: Duration,
    pub timestamp: SystemTime,
}

#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    measurements: Vec<Measurement>,
    marks: HashMap<String, Instant>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_measure(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Returns `None` when `name` was never started.
    pub fn end_measure(&mut self, name: &str) -> Option<Duration> {
        let Some(start) = self.marks.remove(name) else {
            warn!("No start mark found for: {}", name);
            return None;
        };

        let duration = start.elapsed();
        self.measurements.push(Measurement {
            name: name.to_string(),
            duration,
            timestamp: SystemTime::now(),
        });
        Some(duration)
    }

    pub fn measure<T, F>(&mut self, name: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.start_measure(name);
        let result = f();
        self.end_measure(name);
        result
    }

    pub fn metrics(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn metrics_by_name(&self, name: &str) -> Vec<&Measurement> {
        self.measurements.iter().filter(|m| m.name == name).collect()
    }

    pub fn average_duration(&self, name: &str) -> Duration {
        let matching = self.metrics_by_name(name);
        if matching.is_empty() {
            return Duration::ZERO;
        }

        let total: Duration = matching.iter().map(|m| m.duration).sum();
        total / matching.len() as u32
    }

    pub fn clear(&mut self) {
        self.measurements.clear();
        self.marks.clear();
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for m in &self.measurements {
            if !names.contains(&m.name.as_str()) {
                names.push(&m.name);
            }
        }
        names
    }

    pub fn log_summary(&self) {
        for name in self.names() {
            info!(
                "{}: {:.2}ms ({} samples)",
                name,
                self.average_duration(name).as_secs_f64() * 1000.0,
                self.metrics_by_name(name).len()
            );
        }
    }
}
