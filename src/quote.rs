use tracing::trace;

use crate::config::QuoteOptions;

/// Re-wrap rendered output as a block quote.
///
/// `source` stands in for `rendered` when rendering produced nothing from a
/// non-empty input (whitespace-only documents). Trailing newlines are dropped,
/// every remaining line gets a `>` prefix, and the expandable part, when
/// there is one, opens with `**` and closes with `||` after the last line.
pub fn quote(rendered: &[u8], source: &[u8], options: &QuoteOptions) -> Vec<u8> {
    let content = if rendered.is_empty() && !source.is_empty() {
        source
    } else {
        rendered
    };

    let end = content
        .iter()
        .rposition(|&b| b != b'\n')
        .map_or(0, |i| i + 1);
    let content = &content[..end];
    if content.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&[u8]> = content.split(|&b| b == b'\n').collect();
    let expand_from = expandable_from(lines.len(), options);
    trace!(lines = lines.len(), ?expand_from, "quoting document");

    let mut out = Vec::with_capacity(content.len() + lines.len() + 4);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        if expand_from == Some(i) {
            out.extend_from_slice(b"**");
        }
        out.push(b'>');
        out.extend_from_slice(line);
    }
    if expand_from.is_some() {
        out.extend_from_slice(b"||");
    }
    out
}

/// Index of the first line inside the expandable part, if any.
pub fn expandable_from(line_count: usize, options: &QuoteOptions) -> Option<usize> {
    if options.expandable {
        Some(0)
    } else if options.expand_after_lines > 0 && line_count > options.expand_after_lines {
        Some(options.expand_after_lines)
    } else {
        None
    }
}
