//! Alt-text annotation mini-language.
//!
//! Two tokens may appear anywhere in the alt text of `![alt](src)`:
//!
//! - `?size=W*H` sets the image `width` and `height`. Either side may be left
//!   empty to omit that attribute, and the width may contain spaces
//!   (`?size=200 px*`).
//! - `?class=a,b` sets the CSS classes of the wrapping `<p>`.
//!
//! Both tokens are removed from the alt text before rendering.

use std::sync::LazyLock;

use regex::Regex;

/// `?size=<width>*<height>`, width up to the first `*`, height up to whitespace or `?`.
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?size=(.*?)\*([^\s?]*)\s*").unwrap());

/// `?class=<list>`, list up to whitespace or `?`.
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?class=([^\s?]+)\s*").unwrap());

/// Image dimensions from a `?size=` annotation.
///
/// An empty side of the `*` becomes `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Alt text with its annotations pulled out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AltText {
    /// Alt text with annotations removed and surrounding whitespace trimmed.
    pub text: String,
    /// Dimensions, if a `?size=` annotation was present.
    pub size: Option<Size>,
    /// Classes, if a `?class=` annotation was present.
    pub classes: Option<Vec<String>>,
}

/// Annotation values applied to the image being rendered.
///
/// Under the carry-forward policy one value lives for a whole document, so
/// a declaration without its own annotation inherits the last one seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotations {
    pub width: Option<String>,
    pub height: Option<String>,
    /// Classes in the order they were listed; empty means no `class` attribute.
    pub classes: Vec<String>,
}

impl Annotations {
    /// Overlay the annotations found in `alt`.
    ///
    /// A `?size=` annotation replaces both dimensions, a `?class=` annotation
    /// replaces the whole class list. Anything absent is left as is.
    pub fn apply(&mut self, alt: &AltText) {
        if let Some(size) = &alt.size {
            self.width.clone_from(&size.width);
            self.height.clone_from(&size.height);
        }
        if let Some(classes) = &alt.classes {
            self.classes.clone_from(classes);
        }
    }

    /// Forget all annotation values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Parse the raw alt text of an image declaration.
///
/// The first `?size=` and the first `?class=` supply the values; every
/// occurrence of either token is removed from the text. Empty entries in a
/// class list are dropped rather than kept as empty classes, so `?class=a,,b`
/// gives `["a", "b"]` (rendered `class="a b"`, not `class="a  b"`) and
/// `?class=,` gives an empty list.
///
/// When `classes_enabled` is false, `?class=` is not recognised and stays in
/// the returned text.
///
/// # Examples
///
/// ```
/// use md_img::annotation::parse_alt;
///
/// let alt = parse_alt("Alt text ?class=a,b ?size=200px*", true);
/// assert_eq!(alt.text, "Alt text");
/// assert_eq!(alt.classes, Some(vec!["a".to_owned(), "b".to_owned()]));
/// let size = alt.size.unwrap();
/// assert_eq!(size.width.as_deref(), Some("200px"));
/// assert_eq!(size.height, None);
/// ```
pub fn parse_alt(raw: &str, classes_enabled: bool) -> AltText {
    let mut text = raw.to_owned();

    let size = SIZE_RE.captures(&text).map(|caps| Size {
        width: non_empty(caps.get(1).map_or("", |m| m.as_str())),
        height: non_empty(caps.get(2).map_or("", |m| m.as_str())),
    });
    if size.is_some() {
        text = SIZE_RE.replace_all(&text, "").into_owned();
    }

    let classes = if classes_enabled {
        let classes = CLASS_RE.captures(&text).and_then(|caps| {
            let list = caps
                .get(1)?
                .as_str()
                .split(',')
                .filter(|class| !class.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>();
            Some(list)
        });
        if classes.is_some() {
            text = CLASS_RE.replace_all(&text, "").into_owned();
        }
        classes
    } else {
        None
    };

    AltText {
        text: unquote(text.trim()).to_owned(),
        size,
        classes,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

/// Strip one pair of enclosing double quotes (`"Alt text"` → `Alt text`).
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}
