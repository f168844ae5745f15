// Presentation transforms for grid values.

/// Keep only ASCII decimal digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Group digits by three from the right: `1234567` → `1,234,567`.
///
/// Non-digit characters are dropped first, so an already grouped value
/// formats to itself. Empty input gives empty output.
pub fn format_thousands(value: &str) -> String {
    let digits = digits_only(value);
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Shape typed digits into `YYYY`, `YYYY-MM`, `YYYY-MM-DD`.
///
/// Separators appear once the digit count passes 4 and 6. Anything past the
/// eighth digit is ignored.
pub fn format_date_mask(value: &str) -> String {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).take(8).collect();
    let mut out = String::with_capacity(10);
    for (i, ch) in digits.iter().enumerate() {
        if i == 4 || i == 6 {
            out.push('-');
        }
        out.push(*ch);
    }
    out
}

/// Date mask for a keystroke that turned `previous` into `new`.
///
/// Only insertions are reshaped. A deletion passes `new` through unchanged,
/// otherwise backspacing over a `-` would immediately put it back.
pub fn apply_date_mask(previous: &str, new: &str) -> String {
    if new.chars().count() > previous.chars().count() {
        format_date_mask(new)
    } else {
        new.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands("1234567"), "1,234,567");
        assert_eq!(format_thousands("123"), "123");
        assert_eq!(format_thousands("1234"), "1,234");
        assert_eq!(format_thousands("100000"), "100,000");
        assert_eq!(format_thousands(""), "");
    }

    #[test]
    fn thousands_is_idempotent_on_grouped_input() {
        assert_eq!(format_thousands("1,234,567"), "1,234,567");
        assert_eq!(format_thousands("₩12,000"), "12,000");
    }

    #[test]
    fn date_mask_progression() {
        let typed = "20240115";
        let mut previous = String::new();
        let mut seen = Vec::new();
        for end in 1..=typed.len() {
            let next = apply_date_mask(&previous, &format!("{}{}", previous, &typed[end - 1..end]));
            seen.push(next.clone());
            previous = next;
        }
        assert_eq!(seen[3], "2024");
        assert_eq!(seen[5], "2024-01");
        assert_eq!(seen[7], "2024-01-15");
    }

    #[test]
    fn date_mask_caps_at_eight_digits() {
        assert_eq!(format_date_mask("202401150"), "2024-01-15");
        assert_eq!(format_date_mask("2024-01-1"), "2024-01-1");
        assert_eq!(format_date_mask(""), "");
    }

    #[test]
    fn date_mask_passes_deletions_through() {
        assert_eq!(apply_date_mask("2024-01", "2024-0"), "2024-0");
        assert_eq!(apply_date_mask("2024-", "2024"), "2024");
        assert_eq!(apply_date_mask("2024", "2024"), "2024");
    }
}
