use std::borrow::Cow;

/// Replace `$1`, `$2`, ... in `template` with capture groups from the regex
/// match. Groups that did not participate expand to nothing.
///
/// Returns borrowed data when the template contains no placeholders, and
/// borrows straight from the haystack when the template is a single `$N`.
pub(crate) fn substitute<'a>(template: &'a str, captures: &fancy_regex::Captures<'a>) -> Cow<'a, str> {
    if !template.contains('$') {
        return Cow::Borrowed(template);
    }
    if let Some(idx) = sole_group(template) {
        return Cow::Borrowed(captures.get(idx).map(|m| m.as_str()).unwrap_or(""));
    }

    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            result.push('$');
            rest = after;
            continue;
        }
        if let Some(m) = after[..digits].parse().ok().and_then(|idx| captures.get(idx)) {
            result.push_str(m.as_str());
        }
        rest = &after[digits..];
    }
    result.push_str(rest);
    Cow::Owned(result)
}

/// Like [`substitute`], but for version fields: the field is unset when any
/// referenced group is missing or the expansion is empty.
pub(crate) fn substitute_field<'a>(
    template: &'a str,
    captures: &fancy_regex::Captures<'a>,
) -> Option<Cow<'a, str>> {
    let all_present = referenced_groups(template).all(|idx| captures.get(idx).is_some());
    if !all_present {
        return None;
    }
    let value = substitute(template, captures);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn sole_group(template: &str) -> Option<usize> {
    let digits = template.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn referenced_groups(template: &str) -> impl Iterator<Item = usize> + '_ {
    template.match_indices('$').filter_map(move |(pos, _)| {
        let after = &template[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        after[..digits].parse().ok()
    })
}
