use std::fmt::{self, Write};

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::{ConversationView, MessageView};

const STYLE: &str = "body{font-family:sans-serif;max-width:50em;margin:2em auto;color:#222}\
.meta{color:#666;font-size:.9em}\
.message{border-left:3px solid #ccc;padding:.3em .8em;margin:.8em 0}\
.role{font-weight:bold;text-transform:capitalize}\
.content{white-space:pre-wrap}";

/// Standalone HTML document of a conversation; every piece of archive text is escaped.
/// Nested messages are indented by their depth.
pub fn render_html(view: &ConversationView) -> String {
    let mut out = String::new();
    // fmt::Write for String never errors
    let _ = write_document(&mut out, view);
    out
}

fn write_document(out: &mut String, view: &ConversationView) -> fmt::Result {
    let title = encode_text(&view.title);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{title}</title>")?;
    writeln!(out, "<style>{STYLE}</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>{title}</h1>")?;
    writeln!(
        out,
        "<p class=\"meta\">Created: {} &middot; Updated: {}</p>",
        encode_text(&view.create_time),
        encode_text(&view.update_time)
    )?;

    for message in &view.messages {
        write_message(out, message)?;
    }

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn write_message(out: &mut String, message: &MessageView) -> fmt::Result {
    writeln!(
        out,
        "<div class=\"message\" id=\"{}\" style=\"margin-left:{}em\">",
        encode_double_quoted_attribute(&message.message_id),
        message.depth * 2
    )?;
    writeln!(
        out,
        "<div><span class=\"role\">{}</span> <span class=\"meta\">{}</span></div>",
        encode_text(&message.author_role),
        encode_text(&message.timestamp)
    )?;
    writeln!(out, "<div class=\"content\">{}</div>", encode_text(&message.content))?;
    writeln!(out, "</div>")
}
