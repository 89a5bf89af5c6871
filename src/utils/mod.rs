//! Shared utilities: filesystem helpers and external command execution.

pub mod exec;
pub mod fs;
pub mod mime;

/// Human-readable byte size formatting (1024-based).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exp = (bytes as f64).log(1024.0).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    if exp == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[exp])
    }
}
