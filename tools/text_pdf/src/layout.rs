//! Line normalization and page layout.

/// Page geometry in PDF points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    pub page_width: u32,
    pub page_height: u32,
    pub left_margin: f32,
    /// Baseline of the first line on each page.
    pub top_y: f32,
    /// A line may not start at or below this baseline.
    pub bottom_y: f32,
    pub line_height: f32,
    pub font_size: u32,
    /// Wrap column for body text, in characters.
    pub wrap_width: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 612,
            page_height: 792,
            left_margin: 72.0,
            top_y: 792.0 - 42.0,
            bottom_y: 72.0,
            line_height: 16.0,
            font_size: 12,
            wrap_width: 90,
        }
    }
}

/// A positioned line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

pub type Page = Vec<PlacedLine>;

/// Turn markdown-ish source into display lines.
///
/// `# ` and `## ` headings are upper-cased and followed by a blank line, `- `
/// items become bullets, and everything else is word-wrapped. Blank lines are
/// kept as empty strings.
pub fn normalize_lines(source: &str, wrap_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in source.lines() {
        let line = raw.trim_end();
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }
        if let Some(heading) = line.strip_prefix("# ").or_else(|| line.strip_prefix("## ")) {
            lines.push(heading.to_uppercase());
            lines.push(String::new());
            continue;
        }
        let line = match line.strip_prefix("- ") {
            Some(item) => format!("\u{2022} {item}"),
            None => line.to_owned(),
        };
        let wrapped = wrap(&line, wrap_width);
        if wrapped.is_empty() {
            lines.push(line);
        } else {
            lines.extend(wrapped);
        }
    }
    lines
}

/// Greedy word wrap. Runs of whitespace collapse to one space and words longer
/// than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed <= width {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(word.iter());
                current_len += word.len();
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            // Word alone is too long for a line: hard split it.
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Place lines top to bottom, starting a new page when the cursor reaches the
/// bottom margin. Always returns at least one page, possibly empty.
pub fn paginate(lines: &[String], layout: &PageLayout) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current: Page = Vec::new();
    let mut y = layout.top_y;

    let mut push_page = |current: &mut Page, y: &mut f32| {
        if !current.is_empty() {
            pages.push(std::mem::take(current));
        }
        *y = layout.top_y;
    };

    for line in lines {
        if line.is_empty() {
            y -= layout.line_height;
            if y <= layout.bottom_y {
                push_page(&mut current, &mut y);
            }
            continue;
        }
        if y <= layout.bottom_y {
            push_page(&mut current, &mut y);
        }
        current.push(PlacedLine {
            x: layout.left_margin,
            y,
            text: line.clone(),
        });
        y -= layout.line_height;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_bullets_and_blanks() {
        let lines = normalize_lines("# Tech Stack\n\n## Runtime\n- Rust   \nplain", 90);
        assert_eq!(
            lines,
            vec!["TECH STACK", "", "", "RUNTIME", "", "\u{2022} Rust", "plain"]
        );
    }

    #[test]
    fn deeper_headings_are_plain_text() {
        assert_eq!(normalize_lines("### Small", 90), vec!["### Small"]);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap("  spaced   out  ", 20), vec!["spaced out"]);
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("x abcdefgh", 4), vec!["x", "abcd", "efgh"]);
    }

    #[test]
    fn whitespace_only_line_is_kept_blank() {
        assert_eq!(normalize_lines("   ", 90), vec![""]);
    }

    #[test]
    fn first_page_holds_forty_three_lines() {
        let layout = PageLayout::default();
        let lines: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let pages = paginate(&lines, &layout);
        assert_eq!(pages.len(), 2);
        // 750 down to 78 in steps of 16.
        assert_eq!(pages[0].len(), 43);
        assert_eq!(pages[0][0].y, 750.0);
        assert_eq!(pages[0][42].y, 78.0);
        assert_eq!(pages[1][0].y, 750.0);
        assert_eq!(pages[1][0].text, "line 43");
    }

    #[test]
    fn blank_lines_only_advance_the_cursor() {
        let layout = PageLayout::default();
        let lines = vec!["a".to_string(), String::new(), "b".to_string()];
        let pages = paginate(&lines, &layout);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0][1].y, 750.0 - 32.0);
    }

    #[test]
    fn empty_document_has_one_empty_page() {
        let pages = paginate(&[], &PageLayout::default());
        assert_eq!(pages, vec![Vec::<PlacedLine>::new()]);
    }
}
