//! Page shell and small HTML helpers shared by every page

use axum::response::Html;
use pipeline_common::models::DbId;
use std::fmt::Display;

const NAV: &[(&str, &str)] = &[
    ("/", "Dashboard"),
    ("/archetypes", "Archetypes"),
    ("/characters", "Characters"),
    ("/ingredients", "Ingredients"),
    ("/output-types", "Output Types"),
    ("/jobs/builder", "Builder"),
    ("/jobs", "Jobs"),
    ("/media", "Media"),
    ("/top-layer", "Top Layer"),
    ("/projects", "Projects"),
    ("/journal", "Journal"),
    ("/prompt-library", "Prompts"),
    ("/dock", "Dock"),
    ("/data", "Data"),
];

/// Escape text for HTML element content and quoted attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped optional text, empty when absent
pub fn opt(s: &Option<String>) -> String {
    escape(s.as_deref().unwrap_or_default())
}

/// `<option>` list for an id-keyed select, with a leading blank choice
pub fn id_options<T>(
    items: &[T],
    selected: Option<DbId>,
    id: impl Fn(&T) -> DbId,
    label: impl Fn(&T) -> String,
) -> String {
    let mut html = String::from(r#"<option value="">—</option>"#);
    for item in items {
        let item_id = id(item);
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            item_id,
            if selected == Some(item_id) { " selected" } else { "" },
            escape(&label(item))
        ));
    }
    html
}

/// `<option>` list for a closed status enum
pub fn status_options<S: Display + PartialEq>(all: &[S], selected: Option<&S>) -> String {
    all.iter()
        .map(|s| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                s,
                if selected == Some(s) { " selected" } else { "" }
            )
        })
        .collect()
}

/// Status `<select>` that submits its form on change
pub fn status_select<S: Display + PartialEq>(name: &str, all: &[S], current: &S) -> String {
    format!(
        r#"<select name="{}" onchange="this.form.submit()">{}</select>"#,
        name,
        status_options(all, Some(current))
    )
}

/// Small POST form with a single confirm-guarded button
pub fn delete_button(action: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{}" class="inline" onsubmit="return confirm('Delete?')"><button class="danger">{}</button></form>"#,
        action,
        escape(label)
    )
}

/// Thumbnail for an image reference, or nothing when empty
pub fn thumbnail(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(r#"<img class="thumb" src="{}" alt="">"#, escape(path))
    }
}

/// Paste/drop target that uploads an image and stores its URL in `name`
pub fn image_drop(name: &str, value: &str) -> String {
    format!(
        r#"<div class="image-drop" tabindex="0">{}<span>Paste or drop an image</span><input type="hidden" name="{}" value="{}"></div>"#,
        thumbnail(value),
        name,
        escape(value)
    )
}

/// Wrap page content in the shared shell
pub fn page(title: &str, flashes: &[String], body: &str) -> Html<String> {
    let nav: String = NAV
        .iter()
        .map(|(href, label)| format!(r#"<a href="{}">{}</a>"#, href, label))
        .collect();
    let flash_html: String = flashes
        .iter()
        .map(|m| format!(r#"<div class="flash">{}</div>"#, escape(m)))
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · Pipeline</title>
    <link rel="stylesheet" href="/static/pipeline.css">
    <script src="/static/pipeline.js" defer></script>
</head>
<body>
    <header>
        <h1>Pipeline</h1>
        <nav>{nav}</nav>
        <div class="build-info">v{version} ({git_hash})</div>
    </header>
    <main>
        {flash_html}
        <h2>{title}</h2>
        {body}
    </main>
</body>
</html>"#,
        title = escape(title),
        nav = nav,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        flash_html = flash_html,
        body = body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_common::models::JobStatus;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_id_options_marks_selected() {
        let items = vec![(1, "One"), (2, "Two <b>")];
        let html = id_options(&items, Some(2), |i| i.0, |i| i.1.to_string());
        assert!(html.contains(r#"<option value="2" selected>Two &lt;b&gt;</option>"#));
        assert!(html.contains(r#"<option value="1">One</option>"#));
    }

    #[test]
    fn test_status_options() {
        let html = status_options(JobStatus::ALL, Some(&JobStatus::InProgress));
        assert!(html.contains(r#"<option value="in_progress" selected>in_progress</option>"#));
        assert!(html.contains(r#"<option value="planned">planned</option>"#));
    }
}
