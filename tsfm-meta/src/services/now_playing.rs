//! Now-playing line parser
//!
//! The station's current-song feed is a single "Artist - Title" line. The
//! separator varies between plain hyphen, en/em dash, pipe and slash.

/// Separators tried in order; the first one found wins
const SEPARATORS: [&str; 5] = [" - ", " – ", " — ", " | ", " / "];

/// Split a now-playing line into (artist, title)
///
/// Splits on the first occurrence of the first separator present. Returns
/// `None` when no separator matches or either half is empty.
pub fn parse_song_string(text: &str) -> Option<(String, String)> {
    let text = text.trim();

    for sep in SEPARATORS {
        if let Some(index) = text.find(sep) {
            if index == 0 {
                continue;
            }
            let artist = text[..index].trim();
            let title = text[index + sep.len()..].trim();
            if !artist.is_empty() && !title.is_empty() {
                return Some((artist.to_string(), title.to_string()));
            }
        }
    }

    None
}
