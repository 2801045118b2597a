//! Host metrics snapshot.
//!
//! Metrics are gathered once per run and handed to the layout as a read-only
//! map. Every value has a fallback, so collection never fails. The parsers
//! work on file contents and are public for testing.

use std::collections::BTreeMap;
use std::fs;

/// Metric name to display string.
pub type Metrics = BTreeMap<String, String>;

/// Keys present in every snapshot.
pub const KEYS: [&str; 9] = [
    "hostname", "os", "kernel", "uptime", "shell", "terminal", "cpu", "memory", "disk",
];

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Gather a snapshot of all metrics.
pub fn collect() -> Metrics {
    let values = [
        hostname(),
        os_name(),
        kernel(),
        uptime(),
        shell(),
        terminal(),
        cpu(),
        memory(),
        disk(),
    ];

    KEYS.iter()
        .map(|k| k.to_string())
        .zip(values)
        .collect()
}

fn hostname() -> String {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn os_name() -> String {
    fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| parse_os_release(&content))
        .unwrap_or_else(|| {
            let mut chars = std::env::consts::OS.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Unknown".to_string(),
            }
        })
}

fn kernel() -> String {
    fs::read_to_string("/proc/sys/kernel/osrelease")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn uptime() -> String {
    fs::read_to_string("/proc/uptime")
        .ok()
        .and_then(|content| parse_uptime(&content))
        .map(format_uptime)
        .unwrap_or_else(|| "Unknown".to_string())
}

fn shell() -> String {
    std::env::var("SHELL")
        .ok()
        .and_then(|s| s.rsplit('/').next().map(str::to_string))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn terminal() -> String {
    std::env::var("TERM")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn cpu() -> String {
    fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|content| parse_cpu_model(&content))
        .unwrap_or_else(|| "Unknown CPU".to_string())
}

fn memory() -> String {
    fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|content| parse_meminfo(&content))
        .map(|(used, total)| format_usage(used, total))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn disk() -> String {
    disk_usage("/")
        .map(|(used, total)| format_usage(used, total))
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(unix)]
fn disk_usage(path: &str) -> Option<(u64, u64)> {
    let stat = nix::sys::statvfs::statvfs(path).ok()?;

    let frsize = stat.fragment_size() as u64;
    let total = stat.blocks() as u64 * frsize;
    let free = stat.blocks_free() as u64 * frsize;
    Some((total.saturating_sub(free), total))
}

#[cfg(not(unix))]
fn disk_usage(_path: &str) -> Option<(u64, u64)> {
    None
}

/// Extract `PRETTY_NAME` from `/etc/os-release` contents.
pub fn parse_os_release(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|value| !value.is_empty())
}

/// Extract the first `model name` from `/proc/cpuinfo` contents.
pub fn parse_cpu_model(content: &str) -> Option<String> {
    content
        .lines()
        .filter(|line| line.starts_with("model name"))
        .find_map(|line| line.split_once(':'))
        .map(|(_, model)| model.trim().to_string())
        .filter(|model| !model.is_empty())
}

/// Extract (used, total) bytes from `/proc/meminfo` contents.
///
/// Used memory is `MemTotal - MemAvailable`. Older kernels without
/// `MemAvailable` use `MemFree + Buffers + Cached` instead.
pub fn parse_meminfo(content: &str) -> Option<(u64, u64)> {
    let field = |name: &str| -> Option<u64> {
        content.lines().find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
            Some(kb * 1024)
        })
    };

    let total = field("MemTotal")?;
    let available = field("MemAvailable").or_else(|| {
        Some(field("MemFree")? + field("Buffers").unwrap_or(0) + field("Cached").unwrap_or(0))
    })?;

    Some((total.saturating_sub(available), total))
}

/// Extract whole seconds of uptime from `/proc/uptime` contents.
pub fn parse_uptime(content: &str) -> Option<u64> {
    let secs = content.split_whitespace().next()?.parse::<f64>().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(secs as u64)
    } else {
        None
    }
}

/// Format seconds as `"2d 3h 4m"`, leaving out zero parts.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;

    let parts: Vec<String> = [(days, 'd'), (hours, 'h'), (minutes, 'm')]
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{}{}", n, unit))
        .collect();

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

/// Format a used/total byte pair as `"1.5GB / 4.0GB (37.5%)"`.
pub fn format_usage(used: u64, total: u64) -> String {
    let percent = if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    };
    format!(
        "{:.1}GB / {:.1}GB ({:.1}%)",
        used as f64 / GIB,
        total as f64 / GIB,
        percent
    )
}
