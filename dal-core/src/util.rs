/// Call `f` for every value, writing `separator` between two outputs that are not empty.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Shortened statement text for log and error messages.
pub fn truncate_long(sql: &str) -> String {
    match sql.char_indices().nth(497) {
        Some((end, _)) => format!("{}...", sql[..end].trim_end()),
        None => sql.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{separated_by, truncate_long};

    #[test]
    fn separated_skips_empty_outputs() {
        let mut out = String::from("(");
        separated_by(
            &mut out,
            ["a", "", "b"],
            |out, v| out.push_str(v),
            ",",
        );
        assert_eq!(out, "(a,b");
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_long("SELECT 1 "), "SELECT 1");
        let long = "x".repeat(600);
        assert_eq!(truncate_long(&long).len(), 500);
    }
}
