//! Named, priority-ordered line preprocessors.
//!
//! Models the host renderer's preprocessing stage: every registered
//! [`Preprocessor`] receives the document lines in turn, highest priority
//! first, before markdown parsing starts.

use crate::config::ImgConfig;
use crate::preprocessor::ImagePreprocessor;

/// Registration name of the image preprocessor.
pub const IMAGE_PREPROCESSOR_NAME: &str = "img-tag";

/// Priority of the image preprocessor.
///
/// High enough to run ahead of the host's own image handling.
pub const IMAGE_PREPROCESSOR_PRIORITY: i32 = 100;

/// A stage that transforms raw markdown lines.
///
/// Implementations must return one line per input line.
///
/// # Example
///
/// ```
/// use md_img::{Preprocessor, PreprocessorRegistry};
///
/// struct Shout;
///
/// impl Preprocessor for Shout {
///     fn run(&self, lines: Vec<String>) -> Vec<String> {
///         lines.into_iter().map(|l| l.to_uppercase()).collect()
///     }
/// }
///
/// let mut registry = PreprocessorRegistry::new();
/// registry.register("shout", 10, Shout);
/// assert_eq!(registry.run(vec!["hi".to_owned()]), vec!["HI"]);
/// ```
pub trait Preprocessor: Send + Sync {
    /// Transform the document lines.
    fn run(&self, lines: Vec<String>) -> Vec<String>;
}

impl Preprocessor for ImagePreprocessor {
    fn run(&self, lines: Vec<String>) -> Vec<String> {
        self.process(&lines)
    }
}

struct Entry {
    name: String,
    priority: i32,
    preprocessor: Box<dyn Preprocessor>,
}

/// Ordered collection of preprocessors.
///
/// Higher priority runs first; equal priorities keep registration order.
#[derive(Default)]
pub struct PreprocessorRegistry {
    entries: Vec<Entry>,
}

impl PreprocessorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preprocessor, replacing any existing one with the same name.
    pub fn register<P: Preprocessor + 'static>(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        preprocessor: P,
    ) {
        let name = name.into();
        if self.deregister(&name) {
            tracing::debug!(name = %name, priority, "Replacing preprocessor");
        } else {
            tracing::debug!(name = %name, priority, "Registering preprocessor");
        }

        let idx = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            idx,
            Entry {
                name,
                priority,
                preprocessor: Box::new(preprocessor),
            },
        );
    }

    /// Remove a preprocessor by name. Returns `true` if it was registered.
    pub fn deregister(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!(name, "Removed preprocessor");
        }
        removed
    }

    /// Check whether a preprocessor is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Registered names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Number of registered preprocessors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run all preprocessors over `lines` in priority order.
    #[must_use]
    pub fn run(&self, lines: Vec<String>) -> Vec<String> {
        self.entries
            .iter()
            .fold(lines, |lines, entry| entry.preprocessor.run(lines))
    }
}

/// Hooks the image preprocessor into a [`PreprocessorRegistry`].
///
/// # Example
///
/// ```
/// use md_img::{ImgExtension, PreprocessorRegistry};
///
/// let mut registry = PreprocessorRegistry::new();
/// ImgExtension::default().extend(&mut registry);
///
/// let lines = registry.run(vec!["![Logo ?size=64px*](/logo.png)".to_owned()]);
/// assert_eq!(lines, vec![r#"<p><img alt="Logo" src="/logo.png" width="64px" /></p>"#]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ImgExtension {
    config: ImgConfig,
}

impl ImgExtension {
    /// Create an extension with custom configuration.
    #[must_use]
    pub fn new(config: ImgConfig) -> Self {
        Self { config }
    }

    /// Register the image preprocessor as `img-tag` with priority 100.
    pub fn extend(&self, registry: &mut PreprocessorRegistry) {
        registry.register(
            IMAGE_PREPROCESSOR_NAME,
            IMAGE_PREPROCESSOR_PRIORITY,
            ImagePreprocessor::with_config(self.config.clone()),
        );
    }
}
