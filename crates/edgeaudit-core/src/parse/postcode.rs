// Site postcode from the hostname naming convention.

/// Token `index` of `hostname` split on `delimiter`.
///
/// `None` if the hostname has too few tokens or the token is empty.
pub fn parse_postcode(hostname: &str, delimiter: char, index: usize) -> Option<String> {
    hostname
        .trim()
        .split(delimiter)
        .nth(index)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}
