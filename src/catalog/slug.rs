//! Lake id derivation.

/// Derives the URL-safe lake id from its display name.
///
/// German umlauts are transliterated (`ä` → `ae`), accented vowels lose their
/// accent, and every run of other characters collapses into a single `-`.
/// The result never starts or ends with `-`, and applying it twice yields the
/// same id.
pub fn lake_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        let replacement: &str = match ch {
            'ä' => "ae",
            'ö' => "oe",
            'ü' => "ue",
            'ß' => "ss",
            'à' | 'á' | 'â' => "a",
            'è' | 'é' | 'ê' | 'ë' => "e",
            'ì' | 'í' | 'î' | 'ï' => "i",
            'ò' | 'ó' | 'ô' => "o",
            'ù' | 'ú' | 'û' => "u",
            'ç' => "c",
            c if c.is_ascii_lowercase() || c.is_ascii_digit() => {
                push_segment(&mut id, &mut pending_dash, c.encode_utf8(&mut [0; 4]));
                continue;
            }
            _ => {
                pending_dash = true;
                continue;
            }
        };
        push_segment(&mut id, &mut pending_dash, replacement);
    }

    id
}

fn push_segment(id: &mut String, pending_dash: &mut bool, segment: &str) {
    if *pending_dash && !id.is_empty() {
        id.push('-');
    }
    *pending_dash = false;
    id.push_str(segment);
}
