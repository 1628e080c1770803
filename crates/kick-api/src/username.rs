/// Resolve a roster identifier to a bare Kick username.
///
/// Profile URLs (`https://kick.com/name?ref=x#top`) are reduced to their last
/// path segment with the query string and fragment stripped. Anything else is
/// treated as a username already.
pub fn extract_username(input: &str) -> String {
    let input = input.trim();
    let Some((_, rest)) = input.split_once("kick.com/") else {
        return input.to_string();
    };

    // Query and fragment may contain slashes of their own.
    let path = rest.split(['?', '#']).next().unwrap_or_default();
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if segment.is_empty() {
        input.to_string()
    } else {
        segment.to_string()
    }
}
