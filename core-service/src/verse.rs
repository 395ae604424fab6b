//! Paging through the verses of a song text.

use core_library::LibraryError;
use serde::{Deserialize, Serialize};

/// Verses are separated by one blank line.
pub const VERSE_SEPARATOR: &str = "\n\n";

/// One verse of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersePage {
    #[serde(rename = "page_idx")]
    pub page_index: u32,
    pub page_count: u32,
    pub verse: String,
}

/// Picks verse `index` out of `text`.
///
/// A text without blank lines is a single verse; an empty text is one empty
/// verse.
pub fn verse_page(text: &str, index: u32) -> Result<VersePage, LibraryError> {
    let verses: Vec<&str> = text.split(VERSE_SEPARATOR).collect();
    let page_count = u32::try_from(verses.len()).unwrap_or(u32::MAX);

    let verse = usize::try_from(index)
        .ok()
        .and_then(|i| verses.get(i))
        .ok_or(LibraryError::PageOutOfBounds {
            page_index: index,
            page_count,
        })?;

    Ok(VersePage {
        page_index: index,
        page_count,
        verse: (*verse).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Is this the real life?\nIs this just fantasy?\n\nMama\n\nGalileo";

    #[test]
    fn test_verses_split_on_blank_lines() {
        let first = verse_page(TEXT, 0).unwrap();
        assert_eq!(first.page_count, 3);
        assert_eq!(first.verse, "Is this the real life?\nIs this just fantasy?");

        assert_eq!(verse_page(TEXT, 2).unwrap().verse, "Galileo");
    }

    #[test]
    fn test_index_past_last_verse() {
        let err = verse_page(TEXT, 3).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::PageOutOfBounds {
                page_index: 3,
                page_count: 3
            }
        ));
    }

    #[test]
    fn test_single_verse_text() {
        let page = verse_page("one line", 0).unwrap();
        assert_eq!(page.page_count, 1);
        assert_eq!(page.verse, "one line");
    }

    #[test]
    fn test_json_shape() {
        let page = verse_page("a\n\nb", 1).unwrap();
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({"page_idx": 1, "page_count": 2, "verse": "b"})
        );
    }
}
