//! Tool naming.

/// Convert a configured entity name into a lower snake_case tool name.
///
/// An underscore is inserted before every uppercase letter that follows a
/// lowercase letter or a digit, then the whole string is lowercased. Runs of
/// capitals therefore stay together (`GetBookByID` -> `get_book_by_id`) and
/// input that is already snake_case is returned unchanged.
pub fn tool_name_from_entity_name(entity_name: &str) -> String {
    let mut out = String::with_capacity(entity_name.len() + 4);
    let mut prev: Option<char> = None;

    for c in entity_name.chars() {
        if c.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }

    out
}
