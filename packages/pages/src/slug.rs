/// Slug of the page every missing lookup falls back to
pub const DEFAULT_SLUG: &str = "home";

/// Lowercase `raw` and replace every character outside `[a-z0-9-]` with `-`.
/// An empty slug addresses the default page.
pub fn normalize_slug(raw: &str) -> String {
    let slug: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

/// Human title for a page without metadata: `about-us` -> `About us`
pub fn title_from_slug(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('-', " "),
        None => String::new(),
    }
}
