//! Plain aligned tables for terminal output.

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const GAP: &str = "  ";
const MIN_COLUMN: usize = 4;

/// Render `rows` under `headers`, shrinking the widest columns to fit
/// `max_width`.
#[must_use]
pub fn render(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(MIN_COLUMN)
        })
        .collect();
    if let Some(max_width) = options.max_width {
        shrink(&mut widths, max_width);
    }

    let header_line = line(headers.iter().copied(), &widths, false);
    let divider = "-".repeat(header_line.chars().count());
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push(divider);
    for row in rows {
        lines.push(line(row.iter().map(String::as_str), &widths, options.color));
    }
    lines.join("\n")
}

fn shrink(widths: &mut [usize], max_width: usize) {
    let total = |w: &[usize]| w.iter().sum::<usize>() + GAP.len() * w.len().saturating_sub(1);
    while total(widths) > max_width {
        let Some(widest) = widths
            .iter_mut()
            .filter(|w| **w > MIN_COLUMN)
            .max_by_key(|w| **w)
        else {
            break;
        };
        *widest -= 1;
    }
}

fn line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize], color: bool) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| {
            let text = truncate(cell, width);
            let pad = " ".repeat(width.saturating_sub(text.chars().count()));
            match status_color(&text).filter(|_| color) {
                Some(code) => format!("\u{1b}[{code}m{text}\u{1b}[0m{pad}"),
                None => format!("{text}{pad}"),
            }
        })
        .collect::<Vec<_>>()
        .join(GAP)
        .trim_end()
        .to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn status_color(text: &str) -> Option<&'static str> {
    match text.to_ascii_lowercase().as_str() {
        "passed" | "valid" | "true" => Some("32"),
        "failed" | "broken" | "false" => Some("31"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn columns_are_aligned() {
        let rows = vec![
            vec!["s1".to_string(), "short".to_string()],
            vec!["study-200".to_string(), "a longer name".to_string()],
        ];
        let out = render(&["id", "name"], &rows, PLAIN);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2].find("short"), lines[3].find("a longer"));
    }

    #[test]
    fn wide_columns_shrink_to_fit() {
        let rows = vec![vec!["x".repeat(60), "y".to_string()]];
        let options = TableOptions {
            max_width: Some(30),
            color: false,
        };
        let out = render(&["long", "short"], &rows, options);
        assert!(out.lines().all(|l| l.chars().count() <= 30), "{out}");
        assert!(out.contains('…'));
    }

    #[test]
    fn statuses_are_colored_only_when_enabled() {
        let rows = vec![vec!["FAILED".to_string()]];
        let colored = render(
            &["status"],
            &rows,
            TableOptions {
                max_width: None,
                color: true,
            },
        );
        assert!(colored.contains("\u{1b}[31m"));
        assert!(!render(&["status"], &rows, PLAIN).contains('\u{1b}'));
    }
}
