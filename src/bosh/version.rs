/// Picks the latest of `versions`. When every version is an integer the
/// highest one wins; otherwise the last version the director listed is
/// taken as-is.
pub(crate) fn latest(versions: &[String]) -> Option<String> {
    let mut numbers = Vec::with_capacity(versions.len());
    for version in versions {
        match version.parse::<i64>() {
            Ok(number) => numbers.push(number),
            Err(_) => return versions.last().cloned(),
        }
    }

    numbers.sort_unstable();
    numbers.last().map(|number| number.to_string())
}
