pub fn format_line(path: Option<&str>, show_filename: bool, line: &str) -> String {
    match (show_filename, path) {
        (true, Some(p)) => format!("{p}:{line}"),
        _ => line.to_string(),
    }
}
