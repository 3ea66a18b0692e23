//! Image preprocessor that rewrites `![alt](src)` into annotated HTML.
//!
//! Runs on raw markdown lines before the host renderer sees them, so the host
//! passes the generated HTML block through untouched.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::annotation::{Annotations, parse_alt};
use crate::config::{AnnotationPolicy, ImgConfig};
use crate::fence::FenceTracker;
use crate::html::render_image;

/// `![alt](src)`, both captures non-greedy.
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

/// Preprocessor that converts annotated image declarations to HTML.
///
/// Each call to [`process`](Self::process) starts from a clean state, so a
/// single instance can serve many documents, including concurrently.
///
/// # Example
///
/// ```
/// use md_img::ImagePreprocessor;
///
/// let preprocessor = ImagePreprocessor::new();
/// let lines = preprocessor.process(&["![Alt text ?class=align-center ?size=200px*400px](/img.png)"]);
///
/// assert_eq!(
///     lines,
///     vec![r#"<p class="align-center"><img alt="Alt text" src="/img.png" width="200px" height="400px" /></p>"#]
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct ImagePreprocessor {
    config: ImgConfig,
}

impl ImagePreprocessor {
    /// Create a preprocessor with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preprocessor with custom configuration.
    #[must_use]
    pub fn with_config(config: ImgConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ImgConfig {
        &self.config
    }

    /// Rewrite every image declaration outside fenced code blocks.
    ///
    /// Returns exactly one output line per input line.
    #[must_use]
    pub fn process<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let mut scan = Scan::new(&self.config);
        let output = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| scan.process_line(line.as_ref(), idx + 1).into_owned())
            .collect();
        scan.finalize();
        output
    }

    /// Rewrite a whole markdown document.
    ///
    /// Line endings are normalised to `\n`; a trailing newline is kept.
    #[must_use]
    pub fn process_str(&self, input: &str) -> String {
        let lines: Vec<&str> = input.lines().collect();
        let mut output = self.process(&lines).join("\n");
        if input.ends_with('\n') {
            output.push('\n');
        }
        output
    }
}

/// State for one pass over a document.
struct Scan<'a> {
    config: &'a ImgConfig,
    fence: FenceTracker,
    annotations: Annotations,
}

impl<'a> Scan<'a> {
    fn new(config: &'a ImgConfig) -> Self {
        Self {
            config,
            fence: FenceTracker::new(),
            annotations: Annotations::default(),
        }
    }

    fn process_line<'l>(&mut self, line: &'l str, line_num: usize) -> Cow<'l, str> {
        let is_marker = self.fence.update(line);

        // Skip fence markers and fenced content
        if is_marker || self.fence.in_fence() {
            return Cow::Borrowed(line);
        }

        let mut result = String::new();
        let mut last = 0;

        for caps in IMAGE_RE.captures_iter(line) {
            let (Some(whole), Some(alt), Some(src)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };

            if self.config.policy == AnnotationPolicy::PerImage {
                self.annotations.reset();
            }

            let alt = parse_alt(alt.as_str(), self.config.classes);
            self.annotations.apply(&alt);

            tracing::debug!(
                line = line_num,
                src = src.as_str(),
                width = ?self.annotations.width,
                height = ?self.annotations.height,
                classes = ?self.annotations.classes,
                "Rewriting image declaration"
            );

            result.push_str(&line[last..whole.start()]);
            result.push_str(&render_image(&alt.text, src.as_str(), &self.annotations));
            last = whole.end();
        }

        if last == 0 {
            return Cow::Borrowed(line);
        }

        result.push_str(&line[last..]);
        Cow::Owned(result)
    }

    fn finalize(&self) {
        if self.fence.in_fence() {
            tracing::warn!("Document ends inside an unclosed code fence");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(lines: &[&str]) -> Vec<String> {
        ImagePreprocessor::new().process(lines)
    }

    fn process_one(line: &str) -> String {
        process(&[line]).remove(0)
    }

    #[test]
    fn test_basic_rewrite() {
        assert_eq!(
            process_one("![Alt text](/img.png)"),
            r#"<p><img alt="Alt text" src="/img.png" /></p>"#
        );
    }

    #[test]
    fn test_quoted_alt_text() {
        assert_eq!(
            process_one("![\"Alt text\"](/img.png)"),
            r#"<p><img alt="Alt text" src="/img.png" /></p>"#
        );
    }

    #[test]
    fn test_sizing() {
        assert_eq!(
            process_one("![Alt text ?size=200px*400px](/img.png)"),
            r#"<p><img alt="Alt text" src="/img.png" width="200px" height="400px" /></p>"#
        );
    }

    #[test]
    fn test_styling_and_sizing() {
        assert_eq!(
            process_one("![Alt text ?class=align-center ?size=200px*400px](/img.png)"),
            r#"<p class="align-center"><img alt="Alt text" src="/img.png" width="200px" height="400px" /></p>"#
        );
    }

    #[test]
    fn test_partial_dimension() {
        assert_eq!(
            process_one("![Alt ?size=200px*](/img.png)"),
            r#"<p><img alt="Alt" src="/img.png" width="200px" /></p>"#
        );
    }

    #[test]
    fn test_multiple_classes() {
        assert_eq!(
            process_one("![Alt ?class=a,b](/img.png)"),
            r#"<p class="a b"><img alt="Alt" src="/img.png" /></p>"#
        );
    }

    #[test]
    fn test_repeated_class_tokens_leave_clean_alt() {
        assert_eq!(
            process_one("![A ?class=a ?class=b](/x.png)"),
            r#"<p class="a"><img alt="A" src="/x.png" /></p>"#
        );
    }

    #[test]
    fn test_star_in_alt_after_size() {
        assert_eq!(
            process_one("![Fig ?size=100px*50px shows a*b](/x.png)"),
            r#"<p><img alt="Fig shows a*b" src="/x.png" width="100px" height="50px" /></p>"#
        );
    }

    #[test]
    fn test_empty_src() {
        assert_eq!(
            process_one("![Alt]()"),
            r#"<p><img alt="Alt" src="" /></p>"#
        );
    }

    #[test]
    fn test_url_src() {
        assert_eq!(
            process_one("![Logo](https://example.com/logo.svg)"),
            r#"<p><img alt="Logo" src="https://example.com/logo.svg" /></p>"#
        );
    }

    #[test]
    fn test_surrounding_text_preserved() {
        assert_eq!(
            process_one("before ![A](a.png) after"),
            r#"before <p><img alt="A" src="a.png" /></p> after"#
        );
    }

    #[test]
    fn test_multiple_images_on_one_line() {
        assert_eq!(
            process_one("![A ?size=1*2](a.png) and ![B](b.png)"),
            concat!(
                r#"<p><img alt="A" src="a.png" width="1" height="2" /></p>"#,
                " and ",
                r#"<p><img alt="B" src="b.png" width="1" height="2" /></p>"#,
            )
        );
    }

    #[test]
    fn test_non_matching_lines_unchanged() {
        let input = [
            "# Title",
            "",
            "A [link](/page) and ![broken alt](",
            "Some `code` here",
        ];
        assert_eq!(process(&input), input);
    }

    #[test]
    fn test_fenced_images_untouched() {
        let input = [
            "```markdown",
            "![A ?size=1*2](a.png)",
            "```",
            "![B](b.png)",
        ];
        let output = process(&input);

        assert_eq!(output[0], "```markdown");
        assert_eq!(output[1], "![A ?size=1*2](a.png)");
        assert_eq!(output[2], "```");
        // Size inside the fence was never seen
        assert_eq!(output[3], r#"<p><img alt="B" src="b.png" /></p>"#);
    }

    #[test]
    fn test_nested_fence_lengths() {
        let input = [
            "````",
            "```",
            "![A](a.png)",
            "```",
            "![B](b.png)",
            "````",
            "![C](c.png)",
        ];
        let output = process(&input);

        assert_eq!(&output[..6], &input[..6]);
        assert_eq!(output[6], r#"<p><img alt="C" src="c.png" /></p>"#);
    }

    #[test]
    fn test_unclosed_fence_passes_rest_through() {
        let input = ["```", "![A](a.png)"];
        assert_eq!(process(&input), input);
    }

    #[test]
    fn test_length_preserved() {
        let input = ["![A](a.png)", "", "```", "![B](b.png)", "```", "text"];
        assert_eq!(process(&input).len(), input.len());
        assert!(process(&[] as &[&str]).is_empty());
    }

    #[test]
    fn test_carry_forward_across_lines() {
        let output = process(&[
            "![First ?size=200px*400px ?class=wide](/a.png)",
            "![Second](/b.png)",
        ]);

        assert_eq!(
            output[1],
            r#"<p class="wide"><img alt="Second" src="/b.png" width="200px" height="400px" /></p>"#
        );
    }

    #[test]
    fn test_carry_forward_partial_override() {
        let output = process(&[
            "![A ?size=1*2 ?class=x](/a.png)",
            "![B ?size=3*](/b.png)",
            "![C ?class=y,z](/c.png)",
        ]);

        assert_eq!(
            output[1],
            r#"<p class="x"><img alt="B" src="/b.png" width="3" /></p>"#
        );
        assert_eq!(
            output[2],
            r#"<p class="y z"><img alt="C" src="/c.png" width="3" /></p>"#
        );
    }

    #[test]
    fn test_per_image_policy_resets() {
        let preprocessor = ImagePreprocessor::with_config(
            ImgConfig::default().with_policy(AnnotationPolicy::PerImage),
        );
        let output = preprocessor.process(&[
            "![First ?size=200px*400px ?class=wide](/a.png) ![Same line](/c.png)",
            "![Second](/b.png)",
        ]);

        assert_eq!(
            output[0],
            concat!(
                r#"<p class="wide"><img alt="First" src="/a.png" width="200px" height="400px" /></p>"#,
                " ",
                r#"<p><img alt="Same line" src="/c.png" /></p>"#,
            )
        );
        assert_eq!(output[1], r#"<p><img alt="Second" src="/b.png" /></p>"#);
    }

    #[test]
    fn test_state_not_shared_between_calls() {
        let preprocessor = ImagePreprocessor::new();
        let _ = preprocessor.process(&["![A ?size=1*2 ?class=x](/a.png)"]);

        assert_eq!(
            preprocessor.process(&["![B](/b.png)"]),
            vec![r#"<p><img alt="B" src="/b.png" /></p>"#]
        );
    }

    #[test]
    fn test_legacy_config_ignores_classes() {
        let preprocessor = ImagePreprocessor::with_config(ImgConfig::legacy());

        assert_eq!(
            preprocessor.process(&["![Alt ?class=x ?size=1*2](/a.png)"]),
            vec![r#"<p><img alt="Alt ?class=x" src="/a.png" width="1" height="2" /></p>"#]
        );
    }

    #[test]
    fn test_classes_disabled_via_builder() {
        let config = ImgConfig::default().with_classes(false);
        let preprocessor = ImagePreprocessor::with_config(config.clone());

        assert_eq!(preprocessor.config(), &config);
        assert!(!preprocessor.config().classes);
        assert_eq!(
            preprocessor.process(&["![Alt ?class=x](/a.png)"]),
            vec![r#"<p><img alt="Alt ?class=x" src="/a.png" /></p>"#]
        );
    }

    #[test]
    fn test_process_str_keeps_trailing_newline() {
        let preprocessor = ImagePreprocessor::new();

        assert_eq!(
            preprocessor.process_str("# Title\n\n![A](a.png)\n"),
            "# Title\n\n<p><img alt=\"A\" src=\"a.png\" /></p>\n"
        );
        assert_eq!(preprocessor.process_str("text"), "text");
    }

    #[test]
    fn test_shared_across_threads() {
        let preprocessor = ImagePreprocessor::new();

        std::thread::scope(|s| {
            let sized = s.spawn(|| preprocessor.process(&["![A ?size=1*2](a.png)", "![B](b.png)"]));
            let plain = s.spawn(|| preprocessor.process(&["![C](c.png)"]));

            assert_eq!(
                sized.join().unwrap()[1],
                r#"<p><img alt="B" src="b.png" width="1" height="2" /></p>"#
            );
            assert_eq!(
                plain.join().unwrap()[0],
                r#"<p><img alt="C" src="c.png" /></p>"#
            );
        });
    }
}
