// Translation seam: the lexical pipeline compares texts in one language.
//
// The translation service itself is an external collaborator behind the
// Translator trait. This module owns the policy around it: long texts go out
// in word-aligned blocks, a profile's paper titles travel in one batched call,
// and any failure falls back to the untranslated text.

pub mod blocks;
pub mod traits;
