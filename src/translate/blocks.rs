// Block-wise translation with per-block fallback.
//
// Translation services cap request size, so text is cut into blocks of at
// most `max_chars` characters, each cut landing on the last space before the
// limit. A block that fails to translate is kept as-is; the rest of the text
// is still translated.

use tracing::warn;

use super::traits::Translator;

/// Default block size in characters.
pub const DEFAULT_BLOCK_CHARS: usize = 4000;

/// Markers used to send several items in one request and split them back.
const ITEM_MARKER: &str = "<ITEM_SPLIT>";
const SECTION_MARKER: &str = "<SECTION_SPLIT>";

/// Cut text into word-aligned blocks of at most `max_chars` characters.
///
/// A run of more than `max_chars` characters without a space is cut hard at
/// the limit.
pub fn split_blocks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut blocks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        if chars[start] == ' ' {
            start += 1;
            continue;
        }

        let mut end = (start + max_chars).min(chars.len());

        if end < chars.len() {
            let mut cut = end;
            while cut > start && chars[cut] != ' ' {
                cut -= 1;
            }
            if cut > start {
                end = cut;
            }
        }

        let block: String = chars[start..end].iter().collect();
        let block = block.trim();
        if !block.is_empty() {
            blocks.push(block.to_string());
        }
        start = end;
    }

    blocks
}

/// Translate text of any length. Never fails: blocks the translator rejects
/// are returned untranslated. Blank input yields an empty string.
pub fn translate_text(translator: &dyn Translator, text: &str, max_chars: usize) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    split_blocks(text, max_chars)
        .into_iter()
        .map(|block| match translator.translate(&block) {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    error = %e,
                    chars = block.chars().count(),
                    "Translation failed, keeping original block"
                );
                block
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Translate several lists of items with a single batched request.
///
/// Items are joined with item markers and the lists with section markers, so
/// a whole profile's titles cost one round trip. When the translated text
/// does not split back into the same shape, the affected list is returned
/// untranslated.
pub fn translate_sections(
    translator: &dyn Translator,
    sections: &[&[String]],
    max_chars: usize,
) -> Vec<Vec<String>> {
    if sections.iter().all(|items| items.is_empty()) {
        return sections.iter().map(|items| items.to_vec()).collect();
    }

    let item_sep = format!("\n{ITEM_MARKER}\n");
    let section_sep = format!("\n{SECTION_MARKER}\n");
    let joined = sections
        .iter()
        .map(|items| items.join(&item_sep))
        .collect::<Vec<_>>()
        .join(&section_sep);

    let translated = translate_text(translator, &joined, max_chars);
    let translated_sections: Vec<&str> = translated.split(SECTION_MARKER).collect();

    if translated_sections.len() != sections.len() {
        warn!(
            expected = sections.len(),
            got = translated_sections.len(),
            "Translated text lost section markers, using original text"
        );
        return sections.iter().map(|items| items.to_vec()).collect();
    }

    sections
        .iter()
        .zip(translated_sections)
        .map(|(original, translated)| {
            if original.is_empty() {
                return Vec::new();
            }
            let items: Vec<String> = translated
                .split(ITEM_MARKER)
                .map(|item| item.trim().to_string())
                .collect();
            if items.len() == original.len() {
                items
            } else {
                warn!(
                    expected = original.len(),
                    got = items.len(),
                    "Translated section lost item markers, using original text"
                );
                original.to_vec()
            }
        })
        .collect()
}
