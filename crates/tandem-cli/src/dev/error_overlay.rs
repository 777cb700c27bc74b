//! Error overlay generator for development mode.
//!
//! Creates an HTML error page displayed in the browser when the client
//! compile fails. The page subscribes to live-reload events, so it goes away
//! on its own after the next successful compile.

use super::server::RELOAD_SCRIPT_PATH;

/// Generate an HTML error overlay page listing every compile error.
///
/// Error text is HTML-escaped; nothing from the messages is executed.
pub fn generate_error_overlay(errors: &[String]) -> String {
    let blocks: String = errors
        .iter()
        .map(|error| format!("        <pre>{}</pre>\n", html_escape(error)))
        .collect();
    let title = if errors.len() == 1 {
        "Failed to compile".to_string()
    } else {
        format!("Failed to compile ({} errors)", errors.len())
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Build Error - Tandem</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: 'Menlo', 'Monaco', 'Courier New', monospace;
            background: #1a1a1a;
            color: #e8e8e8;
            padding: 20px;
            line-height: 1.6;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; }}
        .header {{
            background: #ff4444;
            color: white;
            padding: 20px 30px;
            border-radius: 8px 8px 0 0;
            font-size: 18px;
            font-weight: bold;
        }}
        .error-content {{
            background: #2a2a2a;
            padding: 30px;
            border-radius: 0 0 8px 8px;
            border: 2px solid #ff4444;
            border-top: none;
        }}
        pre {{
            background: #1a1a1a;
            padding: 20px;
            margin-bottom: 16px;
            border-radius: 4px;
            overflow-x: auto;
            white-space: pre-wrap;
            word-wrap: break-word;
            color: #ff6b6b;
            border-left: 4px solid #ff4444;
        }}
        .hint {{ color: #999; font-size: 13px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">{title}</div>
        <div class="error-content">
{blocks}            <p class="hint">This page reloads when the next compile succeeds.</p>
        </div>
    </div>
    <script src="{script}"></script>
</body>
</html>
"#,
        title = title,
        blocks = blocks,
        script = RELOAD_SCRIPT_PATH,
    )
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
