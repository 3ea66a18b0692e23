//! Image sizing and styling for markdown.
//!
//! Extends the alt text of `![alt](src)` with two annotations:
//!
//! - `?size=W*H` sets the image `width` and `height` (either may be empty)
//! - `?class=a,b` sets CSS classes on the wrapping paragraph
//!
//! Keeping the annotations inside the alt text means other renderers
//! (GitHub included) still show a plain image.
//!
//! # Architecture
//!
//! [`ImagePreprocessor`] runs on raw markdown lines, before the host's markdown
//! parser, and replaces each declaration with an HTML block:
//!
//! ```text
//! ![Alt text ?class=align-center ?size=200px*400px](/img.png)
//! ```
//!
//! becomes
//!
//! ```html
//! <p class="align-center"><img alt="Alt text" src="/img.png" width="200px" height="400px" /></p>
//! ```
//!
//! Content of backtick code fences is left alone. Hosts that run a chain of
//! preprocessors can use [`PreprocessorRegistry`] with [`ImgExtension`], which
//! registers the image stage under the name `img-tag` with priority 100.
//!
//! # Example
//!
//! ```
//! use md_img::{AnnotationPolicy, ImagePreprocessor, ImgConfig};
//!
//! let markdown = "![Chart ?size=640px*](/chart.png)\n![Chart, again](/chart.png)\n";
//!
//! // Annotations carry over to later images by default
//! let carried = ImagePreprocessor::new().process_str(markdown);
//! assert!(carried.ends_with(concat!(
//!     r#"<p><img alt="Chart, again" src="/chart.png" width="640px" /></p>"#,
//!     "\n"
//! )));
//!
//! let config = ImgConfig::default().with_policy(AnnotationPolicy::PerImage);
//! let reset = ImagePreprocessor::with_config(config).process_str(markdown);
//! assert!(reset.ends_with(concat!(
//!     r#"<p><img alt="Chart, again" src="/chart.png" /></p>"#,
//!     "\n"
//! )));
//! ```

pub mod annotation;
mod config;
mod fence;
pub mod html;
mod preprocessor;
mod registry;

pub use annotation::{AltText, Annotations, Size};
pub use config::{AnnotationPolicy, ConfigError, ImgConfig};
pub use preprocessor::ImagePreprocessor;
pub use registry::{
    IMAGE_PREPROCESSOR_NAME, IMAGE_PREPROCESSOR_PRIORITY, ImgExtension, Preprocessor,
    PreprocessorRegistry,
};
