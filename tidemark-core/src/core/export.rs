//! Markdown export of a note collection.

use serde::{Deserialize, Serialize};

use crate::core::note::Note;

/// A rendered markdown document plus its suggested filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteExport {
    pub filename: String,
    pub markdown: String,
}

/// Formats a playback position as `mm:ss`.
///
/// Minutes are not capped and there is no hour component, so long videos
/// produce three-digit minute fields.
pub fn format_timestamp(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Converts a video title into a safe filename stem.
///
/// Every character outside ASCII alphanumerics becomes a `-`. Runs are kept
/// as-is, not collapsed. The result is lowercased and truncated to 50
/// characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .take(50)
        .collect()
}

/// Suggested filename for an exported collection.
pub fn export_filename(title: &str) -> String {
    format!("notes-{}.md", sanitize_title(title))
}

/// Renders a collection as a markdown document.
///
/// Notes appear in ascending timestamp order; equal timestamps keep their
/// insertion order. Code notes are fenced, plain notes become paragraphs.
pub fn render_markdown(title: &str, notes: &[Note]) -> String {
    let mut ordered: Vec<&Note> = notes.iter().collect();
    ordered.sort_by_key(|n| n.timestamp);

    let mut doc = format!("# Notes – {title}\n\n");
    for note in ordered {
        doc.push_str(&format!("## {}\n", format_timestamp(note.timestamp)));
        if note.is_code {
            doc.push_str(&format!("```js\n{}\n```\n\n", note.content));
        } else {
            doc.push_str(&format!("{}\n\n", note.content));
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note(id: i64, timestamp: u32, content: &str, is_code: bool) -> Note {
        Note {
            id,
            content: content.to_string(),
            timestamp,
            is_code,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "00:00");
        assert_eq!(format_timestamp(59), "00:59");
        assert_eq!(format_timestamp(125), "02:05");
        assert_eq!(format_timestamp(3599), "59:59");
        assert_eq!(format_timestamp(6000), "100:00");
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Hello World"), "hello-world");
        assert_eq!(
            sanitize_title("C++ Tutorial: Pointers!"),
            "c---tutorial--pointers-"
        );
        assert_eq!(sanitize_title("日本語 intro"), "----intro");
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn test_sanitize_title_truncates_to_fifty_chars() {
        let long = "a".repeat(80);
        assert_eq!(sanitize_title(&long).chars().count(), 50);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("C++ Tutorial: Pointers!"),
            "notes-c---tutorial--pointers-.md"
        );
    }

    #[test]
    fn test_render_markdown_orders_and_fences() {
        let notes = vec![
            note(2, 125, "let x = 5;", true),
            note(1, 30, "intro starts here", false),
        ];

        let doc = render_markdown("Rust Traits", &notes);
        assert_eq!(
            doc,
            "# Notes – Rust Traits\n\n\
             ## 00:30\n\
             intro starts here\n\n\
             ## 02:05\n\
             ```js\nlet x = 5;\n```\n\n"
        );
    }

    #[test]
    fn test_render_markdown_keeps_insertion_order_for_ties() {
        let notes = vec![
            note(1, 60, "first at the minute", false),
            note(2, 60, "second at the minute", false),
        ];

        let doc = render_markdown("Ties", &notes);
        let first = doc.find("first at the minute").unwrap();
        let second = doc.find("second at the minute").unwrap();
        assert!(first < second);
    }
}
