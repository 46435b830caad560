use crate::output::format_line;
use crate::regex::{Compiled, matches};

pub fn search_content(
    content: &str,
    compiled: &Compiled,
    path: Option<&str>,
    show_filename: bool,
) -> bool {
    let mut any_matched = false;
    for line in content.lines() {
        if matches(compiled, line) {
            any_matched = true;
            println!("{}", format_line(path, show_filename, line));
        }
    }
    any_matched
}
