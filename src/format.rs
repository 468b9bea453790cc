use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * 1024 * 1024;

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// "used / total GB (load%)", the memory gauge label.
pub fn format_memory_usage(used: u64, total: u64, load_percent: f64) -> String {
    format!(
        "{:.1} GB / {:.1} GB ({:.0}%)",
        used as f64 / GB as f64,
        total as f64 / GB as f64,
        load_percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_pick_the_largest_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2 KB");
        assert_eq!(format_bytes(5 * MB + MB / 2), "5.5 MB");
        assert_eq!(format_bytes(3 * GB), "3.0 GB");
    }

    #[test]
    fn memory_usage_label() {
        assert_eq!(format_memory_usage(GB, 4 * GB, 25.0), "1.0 GB / 4.0 GB (25%)");
    }

    #[test]
    fn truncation_appends_ellipsis() {
        assert_eq!(truncate_unicode("short", 10), "short");
        assert_eq!(truncate_unicode("a-long-process-name", 6), "a-lon\u{2026}");
    }
}
