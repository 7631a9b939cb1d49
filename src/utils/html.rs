// src/utils/html.rs

use ammonia::Builder;

/// Sanitizes note HTML written by admins before it is stored.
///
/// Scripts and event handlers are dropped; `<sub>` and `<sup>` are kept for formulas.
pub fn clean_note_html(input: &str) -> String {
    Builder::default()
        .add_tags(&["sub", "sup"])
        .clean(input)
        .to_string()
}
