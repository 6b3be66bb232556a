/// Formats a byte count with thousands separators, e.g. `1,234,567`
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Status code colour for the request log: cyan for 2xx, yellow for 4xx, red for 5xx
pub fn status_color(status: u16) -> &'static str {
    match status {
        200..=299 => "36",
        500..=599 => "31",
        _ => "33",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_status_color() {
        assert_eq!(status_color(201), "36");
        assert_eq!(status_color(404), "33");
        assert_eq!(status_color(500), "31");
    }
}
