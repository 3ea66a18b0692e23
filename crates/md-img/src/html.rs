//! HTML fragment for an annotated image.

use std::fmt::Write;

use crate::annotation::Annotations;

/// Render `<p[ class=".."]><img alt=".." src=".." [width=".." ][height=".." ]/></p>`.
///
/// Values are written as given; the host already owns escaping.
///
/// # Examples
///
/// ```
/// use md_img::{Annotations, html::render_image};
///
/// let annotations = Annotations {
///     width: Some("200px".to_owned()),
///     height: None,
///     classes: vec!["a".to_owned(), "b".to_owned()],
/// };
/// assert_eq!(
///     render_image("Alt", "/img.png", &annotations),
///     r#"<p class="a b"><img alt="Alt" src="/img.png" width="200px" /></p>"#
/// );
/// ```
pub fn render_image(alt: &str, src: &str, annotations: &Annotations) -> String {
    let mut out = String::with_capacity(alt.len() + src.len() + 48);

    out.push_str("<p");
    if !annotations.classes.is_empty() {
        write!(out, r#" class="{}""#, annotations.classes.join(" ")).unwrap();
    }
    write!(out, r#"><img alt="{alt}" src="{src}" "#).unwrap();
    if let Some(width) = &annotations.width {
        write!(out, r#"width="{width}" "#).unwrap();
    }
    if let Some(height) = &annotations.height {
        write!(out, r#"height="{height}" "#).unwrap();
    }
    out.push_str("/></p>");

    out
}
