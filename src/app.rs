use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};

use crate::cli::Config;
use crate::regex;
use crate::search::search_content;

pub fn run(cfg: &Config) -> Result<bool> {
    let compiled =
        regex::compile(&cfg.pattern).with_context(|| format!("bad pattern '{}'", cfg.pattern))?;

    if cfg.paths.is_empty() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("reading standard input")?;
        return Ok(search_content(&buffer, &compiled, None, false));
    }

    let show_filename = cfg.paths.len() > 1;
    let mut any_matched = false;
    for path in &cfg.paths {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading '{path}'"))?;
        if search_content(&content, &compiled, Some(path.as_str()), show_filename) {
            any_matched = true;
        }
    }
    Ok(any_matched)
}
