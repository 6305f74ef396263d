//! Text rendering of a loaded board page.
//!
//! A pure tree walk: one block per comment (meta line, then the body),
//! replies indented one step deeper, and a page footer at the bottom.
//! The tree arrives fresh from the backend on every load and is taken to
//! be acyclic, so the walk recurses without a depth guard.

use crate::board::BoardPage;
use crate::tree::Comment;

/// Indent prefix per nesting level.
const INDENT: &str = "  ";

/// Render a full page: the comment tree plus a `Page N` footer.
pub fn render_page(page: &BoardPage) -> String {
    let mut out = String::new();
    if page.comments.is_empty() {
        out.push_str("(no comments)\n");
    } else {
        render_nodes(&mut out, &page.comments, 0);
    }
    out.push_str(&format!("Page {}\n", page.page));
    out
}

/// Render a sibling run at one nesting level, recursing into replies.
fn render_nodes(out: &mut String, comments: &[Comment], level: usize) {
    let pad = INDENT.repeat(level);
    for comment in comments {
        out.push_str(&format!(
            "{pad}#{} • {}\n",
            comment.id,
            comment.date.format("%Y-%m-%d %H:%M")
        ));
        for line in comment.text.lines() {
            out.push_str(&format!("{pad}{line}\n"));
        }
        if !comment.children.is_empty() {
            render_nodes(out, &comment.children, level + 1);
        }
    }
}

// ---------- Tests ----------
