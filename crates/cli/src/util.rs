use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
/// Uses Unicode display width so CJK/emoji alignment stays correct.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if width < 3 {
        // Just return the first char if it fits, else empty
        for ch in s.chars() {
            let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if cw <= width {
                return ch.to_string();
            }
        }
        return String::new();
    }

    let str_width = UnicodeWidthStr::width(s);
    if str_width <= width {
        return s.to_string();
    }

    // Walk chars, accumulating display width, stop at width - 2 to leave room for ".."
    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}..", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns.
/// If shorter, right-pads with spaces. If longer, truncates with "..".
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Widest a table column may grow before values are truncated.
pub(crate) const MAX_COLUMN_WIDTH: usize = 32;

/// Column widths for a plain table: the widest header or cell, capped.
pub(crate) fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(c, h)| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|v| display_width(v))
                .chain(std::iter::once(display_width(h)))
                .max()
                .unwrap_or(0)
                .clamp(1, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Print rows as an aligned text table (no TUI, no raw mode).
pub(crate) fn write_table<W: Write>(w: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let widths = column_widths(headers, rows);

    let header: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &cw)| pad_right(h, cw))
        .collect();
    writeln!(w, "{}", header.join(" ").trim_end())?;

    let rule: Vec<String> = widths.iter().map(|&cw| "-".repeat(cw)).collect();
    writeln!(w, "{}", rule.join(" "))?;

    for row in rows {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(c, &cw)| pad_right(row.get(c).map(String::as_str).unwrap_or(""), cw))
            .collect();
        writeln!(w, "{}", cells.join(" ").trim_end())?;
    }
    Ok(())
}
