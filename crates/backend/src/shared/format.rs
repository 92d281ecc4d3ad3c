/// Formats a count with dot thousands separators ("1.234.567")
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Average resolution time as shown on the dashboard ("12.3 horas")
pub fn format_hours(hours: Option<f64>) -> String {
    match hours {
        Some(h) if h.is_finite() => format!("{:.1} horas", h),
        _ => "N/A".to_string(),
    }
}

/// Share of `part` in `total`, in percent; 0 when `total` is 0
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(Some(12.34)), "12.3 horas");
        assert_eq!(format_hours(Some(0.0)), "0.0 horas");
        assert_eq!(format_hours(None), "N/A");
        assert_eq!(format_hours(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(3, 0), 0.0);
    }
}
