/// Splits a comma-separated annotation value into trimmed, non-empty tokens,
/// preserving their relative order.
///
/// An absent annotation is passed in as the empty string and yields an empty
/// list.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
