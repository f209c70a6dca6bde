//! Netscape bookmark file export.
//!
//! Produces the `<!DOCTYPE NETSCAPE-Bookmark-file-1>` format every major
//! browser can import. Folders become `<H3>` headings followed by a nested
//! `<DL>`; bookmarks become `<A>` links. `ADD_DATE` is in Unix seconds.

use bookmarkup_shared::{BookmarkRecord, FolderNode, Node, SourceDocument, Timestamp, TreeItem};

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
";

const INDENT: &str = "    ";

/// Render the whole document as a Netscape bookmark file.
pub(crate) fn render(document: &SourceDocument) -> String {
    let mut out = String::from(HEADER);
    out.push_str("<DL><p>\n");
    render_node(&mut out, None, &document.roots, 1);
    out.push_str("</DL><p>\n");
    out
}

fn render_node(out: &mut String, key: Option<&str>, node: &Node, depth: usize) {
    match node {
        Node::Url(record) => render_bookmark(out, record, depth),
        Node::Folder(folder) => render_folder(out, key, folder, depth),
        Node::Container(container) => match key {
            // The outermost container's entries sit directly in the top list.
            None => {
                for (name, child) in &container.entries {
                    render_node(out, Some(name.as_str()), child, depth);
                }
            }
            Some(key) => {
                line(out, depth, &format!("<DT><H3>{}</H3>", escape(key)));
                line(out, depth, "<DL><p>");
                for (name, child) in &container.entries {
                    render_node(out, Some(name.as_str()), child, depth + 1);
                }
                line(out, depth, "</DL><p>");
            }
        },
    }
}

fn render_folder(out: &mut String, key: Option<&str>, folder: &FolderNode, depth: usize) {
    let name = match (folder.name.as_str(), key) {
        ("", Some(key)) => key,
        (name, _) => name,
    };
    let toolbar = if key == Some("bookmark_bar") {
        " PERSONAL_TOOLBAR_FOLDER=\"true\""
    } else {
        ""
    };

    line(
        out,
        depth,
        &format!(
            "<DT><H3{}{toolbar}>{}</H3>",
            add_date(folder.date_added.as_ref()),
            escape(name)
        ),
    );
    line(out, depth, "<DL><p>");
    for child in &folder.children {
        match child {
            TreeItem::Url(record) => render_bookmark(out, record, depth + 1),
            TreeItem::Folder(sub) => render_folder(out, None, sub, depth + 1),
        }
    }
    line(out, depth, "</DL><p>");
}

fn render_bookmark(out: &mut String, record: &BookmarkRecord, depth: usize) {
    line(
        out,
        depth,
        &format!(
            "<DT><A HREF=\"{}\"{}>{}</A>",
            escape(&record.url),
            add_date(record.date_added.as_ref()),
            escape(&record.name)
        ),
    );
}

fn add_date(timestamp: Option<&Timestamp>) -> String {
    match timestamp.and_then(Timestamp::to_unix_seconds) {
        Some(seconds) if seconds > 0 => format!(" ADD_DATE=\"{seconds}\""),
        _ => String::new(),
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_store;
    use serde_json::json;

    fn rendered() -> String {
        render(&SourceDocument::from_json(&sample_store()).unwrap())
    }

    #[test]
    fn escapes_names_and_urls() {
        let html = rendered();
        assert!(html.contains("Tom &amp; Jerry &lt;Fan Site&gt;"));
        assert!(html.contains("HREF=\"https://example.com/?a=1&amp;b=&quot;2&quot;\""));
    }

    #[test]
    fn marks_toolbar_and_nests_folders() {
        let html = rendered();
        assert!(html.contains("PERSONAL_TOOLBAR_FOLDER=\"true\">Bookmarks bar</H3>"));
        assert!(html.contains(&format!(
            "{INDENT}{INDENT}<DT><H3 ADD_DATE=\"1609459200\">Reading</H3>"
        )));
        assert!(html.contains(&format!(
            "{INDENT}{INDENT}{INDENT}<DT><A HREF=\"https://doc.rust-lang.org/book/\">Rust Book</A>"
        )));
        assert_eq!(html.matches("<DL><p>").count(), html.matches("</DL><p>").count());
    }

    #[test]
    fn unnamed_root_folder_uses_its_key() {
        let doc = SourceDocument::from_json(&json!({
            "roots": { "other": { "type": "folder", "children": [] } }
        }))
        .unwrap();
        assert!(render(&doc).contains("<DT><H3>other</H3>"));
    }

    #[test]
    fn add_date_skips_unknown_and_epoch() {
        assert_eq!(add_date(None), "");
        assert_eq!(add_date(Some(&Timestamp::from("0"))), "");
        assert_eq!(
            add_date(Some(&Timestamp::from("13253932800000000"))),
            " ADD_DATE=\"1609459200\""
        );
    }
}
