use std::env;
use std::process;

use linegrep::{app, cli};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let cfg = match cli::parse_args(&args) {
        Ok(cfg) => cfg,
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    };

    match app::run(&cfg) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(1);
        }
    }
}
