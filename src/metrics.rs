//! Prometheus metrics.
//!
//! Lock-free counters and gauges shared between the duty loop, the outlet
//! worker and the HTTP server, rendered on demand in the Prometheus text
//! exposition format.  The ESP32 cores have no 64-bit atomics, so values
//! are 32 bits wide.

use core::fmt::Write as _;
use std::sync::atomic::{AtomicU32, Ordering};

// ───────────────────────────────────────────────────────────────
// Metric types
// ───────────────────────────────────────────────────────────────

/// Monotonic counter.
#[derive(Debug)]
pub struct Counter {
    name: &'static str,
    help: &'static str,
    value: AtomicU32,
}

impl Counter {
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            value: AtomicU32::new(0),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge holding an `f32`, stored as its bit pattern.
#[derive(Debug)]
pub struct Gauge {
    name: &'static str,
    help: &'static str,
    bits: AtomicU32,
}

impl Gauge {
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            // 0.0_f32.to_bits() == 0
            bits: AtomicU32::new(0),
        }
    }

    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

// ───────────────────────────────────────────────────────────────
// Registry
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Metrics {
    pub temperature_points_captured: Counter,
    pub fridge_resets: Counter,
    pub outlet_request_failures: Counter,
    pub current_temperature: Gauge,
    pub sensor_battery_percent: Gauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            temperature_points_captured: Counter::new(
                "temperature_points_captured",
                "Number of temperature samples received from the sensor",
            ),
            fridge_resets: Counter::new("fridge_resets", "Number of outlet power cycles issued"),
            outlet_request_failures: Counter::new(
                "outlet_request_failures",
                "Number of outlet requests that failed",
            ),
            current_temperature: Gauge::new(
                "current_temperature",
                "Most recent freezer temperature in degrees Fahrenheit",
            ),
            sensor_battery_percent: Gauge::new(
                "sensor_battery_percent",
                "Most recent sensor battery level in percent",
            ),
        }
    }

    /// Render every metric in the Prometheus text format.
    pub fn export(&self) -> String {
        let mut out = String::with_capacity(1024);
        push_counter(&mut out, &self.temperature_points_captured);
        push_counter(&mut out, &self.fridge_resets);
        push_counter(&mut out, &self.outlet_request_failures);
        push_gauge(&mut out, &self.current_temperature);
        push_gauge(&mut out, &self.sensor_battery_percent);
        out
    }
}

// Writing into a String cannot fail.
fn push_counter(out: &mut String, c: &Counter) {
    let _ = writeln!(out, "# HELP {} {}", c.name, c.help);
    let _ = writeln!(out, "# TYPE {} counter", c.name);
    let _ = writeln!(out, "{} {}", c.name, c.get());
}

fn push_gauge(out: &mut String, g: &Gauge) {
    let _ = writeln!(out, "# HELP {} {}", g.name, g.help);
    let _ = writeln!(out, "# TYPE {} gauge", g.name);
    let _ = writeln!(out, "{} {}", g.name, g.get());
}
