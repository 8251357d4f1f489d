//! File names for downloaded thumbnails.
//!
//! Names are derived from whatever metadata the result offers (alt text,
//! the image URL, the headline) and suffixed with a microsecond timestamp so
//! repeated downloads of the same picture do not overwrite each other.

use chrono::{DateTime, Local};
use std::sync::Arc;
use url::Url;

/// Extension appended to every generated name.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Characters of alt text or title kept before sanitizing.
const MAX_STEM_CHARS: usize = 50;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Builds collision-resistant image file names.
///
/// Two calls produce different names whenever the clock has advanced by at
/// least a microsecond between them, even with identical arguments. Calls
/// within the same microsecond may collide.
#[derive(Clone)]
pub struct FilenameGenerator {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for FilenameGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilenameGenerator").finish_non_exhaustive()
    }
}

impl Default for FilenameGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl FilenameGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Derive a file name for an image.
    ///
    /// The stem is, in order of preference: the sanitized alt text, the last
    /// path segment of `image_url`, or the sanitized title. It is followed by
    /// `_<YYYYmmddHHMMSSffffff>.jpg`, so the result is never empty.
    pub fn generate(&self, title: &str, alt_text: &str, image_url: &str) -> String {
        let stem = if !alt_text.is_empty() {
            sanitize(alt_text)
        } else {
            let segment = last_path_segment(image_url);
            if segment.is_empty() {
                sanitize(title)
            } else {
                segment
            }
        };

        let timestamp = self.clock.now().format("%Y%m%d%H%M%S%6f");
        format!("{stem}_{timestamp}.{IMAGE_EXTENSION}")
    }
}

/// Replace everything outside `[A-Za-z0-9_-]` in the first 50 characters with `_`.
fn sanitize(text: &str) -> String {
    text.chars()
        .take(MAX_STEM_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Last segment of a URL's path, ignoring any query string or fragment.
///
/// Relative URLs (as found in some `srcset` values) are split by hand.
fn last_path_segment(image_url: &str) -> String {
    match Url::parse(image_url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string(),
        Err(_) => image_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string(),
    }
}
