// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Markdown-lite
//!
//! Generated answers use a small subset of Markdown. This renders that subset
//! to HTML for display:
//!
//! * `# `, `## ` and `### ` headings become `h2`, `h3` and `h4`;
//! * `**bold**` becomes `strong`;
//! * lines starting with `* ` (or `- `, optionally indented) become `li`
//!   items, one `ul` per consecutive run;
//! * every other non-empty line is kept, and blocks are joined with `<br />`.
//!
//! Text is HTML-escaped before any markup is added.

enum Block {
    Heading(usize, String),
    List(Vec<String>),
    Line(String),
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Replaces `**x**` pairs with `<strong>x</strong>`. An unmatched `**` is
/// left as is.
fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped.as_str();
    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        match after_open.find("**") {
            Some(close) => {
                out.push_str(&rest[..open]);
                out.push_str("<strong>");
                out.push_str(&after_open[..close]);
                out.push_str("</strong>");
                rest = &after_open[close + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn heading(line: &str) -> Option<(usize, &str)> {
    [("### ", 4), ("## ", 3), ("# ", 2)]
        .into_iter()
        .find_map(|(marker, level)| line.strip_prefix(marker).map(|text| (level, text)))
}

fn list_item(line: &str) -> Option<&str> {
    line.strip_prefix("* ")
        .or_else(|| line.trim_start().strip_prefix("- "))
}

/// Converts markdown-lite `text` to HTML.
pub fn markdown_lite_to_html(text: &str) -> String {
    let mut blocks: Vec<Block> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some((level, content)) = heading(line) {
            blocks.push(Block::Heading(level, render_inline(content.trim())));
        } else if let Some(item) = list_item(line) {
            let item = render_inline(item.trim());
            match blocks.last_mut() {
                Some(Block::List(items)) => items.push(item),
                _ => blocks.push(Block::List(vec![item])),
            }
        } else {
            blocks.push(Block::Line(render_inline(line.trim())));
        }
    }

    blocks
        .into_iter()
        .map(|block| match block {
            Block::Heading(level, content) => format!("<h{0}>{1}</h{0}>", level, content),
            Block::List(items) => {
                let items: String = items
                    .into_iter()
                    .map(|item| format!("<li>{}</li>", item))
                    .collect();
                format!("<ul>{}</ul>", items)
            }
            Block::Line(content) => content,
        })
        .collect::<Vec<_>>()
        .join("<br />")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_lists_and_lines() {
        let text = "# Pitta\nFavor **cooling** foods:\n* cucumber\n- coconut\n\n## Avoid\n  - chili\nThat is all.";
        assert_eq!(
            markdown_lite_to_html(text),
            "<h2>Pitta</h2><br />Favor <strong>cooling</strong> foods:<br />\
             <ul><li>cucumber</li><li>coconut</li></ul><br />\
             <h3>Avoid</h3><br /><ul><li>chili</li></ul><br />That is all."
        );
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(
            markdown_lite_to_html("<script>alert('x')</script> & **ok**"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; <strong>ok</strong>"
        );
    }

    #[test]
    fn test_unmatched_bold_and_level_three_heading() {
        assert_eq!(markdown_lite_to_html("### Note\n**open"), "<h4>Note</h4><br />**open");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(markdown_lite_to_html(""), "");
        assert_eq!(markdown_lite_to_html("\n\n"), "");
    }
}
