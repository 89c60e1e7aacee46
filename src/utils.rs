/// Cut `s` to at most `max` chars for log output.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}... ({} bytes total)", &s[..idx], s.len()),
        None => s.to_string(),
    }
}
