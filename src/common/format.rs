use colored::*;

use crate::model::ThreatSeverity;

/// Human-readable byte size: whole bytes, one decimal for KB, two above
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    match bytes {
        b if b >= TB => format!("{:.2} TB", b as f64 / TB as f64),
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

/// Size colored by magnitude: red from 1 GB, yellow from 100 MB
pub fn format_size_colored(bytes: u64) -> ColoredString {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB100: u64 = 100 * 1024 * 1024;

    let s = format_size(bytes);
    match bytes {
        b if b >= GB => s.red().bold(),
        b if b >= MB100 => s.yellow(),
        _ => s.white(),
    }
}

/// Count with the right plural: `format_count(1, "item")` → "1 item"
pub fn format_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Path for display, with the home directory shortened to ~
pub fn format_path(path: &std::path::Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(&home).ok().map(|p| format!("~/{}", p.display())))
        .unwrap_or_else(|| path.display().to_string())
}

/// Duration in the most natural unit
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{}m {:.0}s", mins, remaining)
    }
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction)
}

/// Colorize a threat severity label
pub fn format_severity(severity: ThreatSeverity) -> ColoredString {
    match severity {
        ThreatSeverity::Low => "low".yellow(),
        ThreatSeverity::Medium => "medium".red(),
        ThreatSeverity::High => "high".red().bold(),
    }
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Truncate a string to max length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
        assert_eq!(format_size(1099511627776), "1.00 TB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0, "item"), "0 items");
        assert_eq!(format_count(1, "item"), "1 item");
        assert_eq!(format_count(42, "session"), "42 sessions");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.5), "500ms");
        assert_eq!(format_duration(3.7), "3.7s");
        assert_eq!(format_duration(125.0), "2m 5s");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(42.25), "42.2%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("abcdef", 2), "..");
    }
}
