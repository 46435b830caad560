#[derive(Debug, Clone)]
pub struct Config {
    pub pattern: String,
    pub paths: Vec<String>,
}

const USAGE: &str = "usage: linegrep -E <pattern> [file ...]";

pub fn parse_args(args: &[String]) -> Result<Config, String> {
    match args.first() {
        Some(flag) if flag == "-E" => {}
        _ => return Err(USAGE.to_string()),
    }

    let pattern = args.get(1).ok_or_else(|| USAGE.to_string())?.clone();
    let paths = args[2..].to_vec();

    Ok(Config { pattern, paths })
}
