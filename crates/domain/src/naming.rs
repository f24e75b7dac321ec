//! Display-name disambiguation.

/// Return `base` if no taken name equals it, otherwise `"<base> n"` for the
/// smallest `n >= 2` that is free.
#[must_use]
pub fn disambiguate<'a>(base: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = taken.into_iter().collect();
    if !taken.contains(&base) {
        return base.to_string();
    }
    (2_u32..)
        .map(|n| format!("{base} {n}"))
        .find(|candidate| !taken.contains(&candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
