// Translator trait: swap-ready abstraction over the translation service.

use anyhow::Result;

/// A translation backend that turns text into the target language.
///
/// Implementations may fail; callers go through `blocks::translate_text`,
/// which never lets a failure past the boundary.
pub trait Translator {
    fn translate(&self, text: &str) -> Result<String>;
}

/// Returns text unchanged. Used when the source text is already in the
/// target language or no translation backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, text: &str) -> Result<String> {
        (**self).translate(text)
    }
}
