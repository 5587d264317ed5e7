//! Home page rendering
//!
//! The page is a plain view model; rendering to HTML happens only when it
//! is turned into a response, so handlers can be tested on the model.

use axum::response::{Html, IntoResponse, Response};

use crate::db::Visitor;

/// Shown when the visitor list cannot be loaded
pub const DB_NOT_CONNECTED: &str =
    "Database not connected. Please check Cloud SQL configuration.";

/// Data for the index page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPage {
    pub visitors: Vec<Visitor>,
    pub error: Option<String>,
}

impl IndexPage {
    pub fn with_visitors(visitors: Vec<Visitor>) -> Self {
        Self {
            visitors,
            error: None,
        }
    }

    pub fn not_connected() -> Self {
        Self {
            visitors: Vec::new(),
            error: Some(DB_NOT_CONNECTED.to_string()),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>Visitor Log</title>\n\
             <link rel=\"stylesheet\" href=\"/style.css\">\n\
             </head>\n<body>\n<main>\n<h1>Visitor Log</h1>\n",
        );

        if let Some(error) = &self.error {
            out.push_str(&format!(
                "<p class=\"error\" role=\"alert\">{}</p>\n",
                html_escape(error)
            ));
        }

        out.push_str(
            "<form method=\"post\" action=\"/sign\">\n\
             <input name=\"name\" placeholder=\"Your name\" maxlength=\"100\" required>\n\
             <textarea name=\"message\" placeholder=\"Leave a message\"></textarea>\n\
             <button type=\"submit\">Sign</button>\n\
             </form>\n",
        );

        if self.visitors.is_empty() {
            out.push_str("<p class=\"empty\">No visitors yet.</p>\n");
        } else {
            out.push_str("<ul class=\"visitors\">\n");
            for visitor in &self.visitors {
                out.push_str("<li>");
                out.push_str(&format!(
                    "<strong>{}</strong>",
                    html_escape(&visitor.name)
                ));
                if let Some(created_at) = visitor.created_at {
                    out.push_str(&format!(
                        " <time datetime=\"{}\">{}</time>",
                        created_at.format("%Y-%m-%dT%H:%M:%S"),
                        created_at.format("%Y-%m-%d %H:%M")
                    ));
                }
                if let Some(message) = visitor.message.as_deref().filter(|m| !m.is_empty()) {
                    out.push_str(&format!("<p>{}</p>", html_escape(message)));
                }
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }

        out.push_str("</main>\n</body>\n</html>\n");
        out
    }
}

impl IntoResponse for IndexPage {
    fn into_response(self) -> Response {
        Html(self.render()).into_response()
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
