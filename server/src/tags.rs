//! Tag parsing for the notes composer.

/// Split a raw tag string on runs of whitespace, commas and `#`,
/// dropping empty tokens and lower-casing the survivors. Order is
/// preserved; duplicates are not deduplicated.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',' || c == '#')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
