#![forbid(unsafe_code)]

use std::process::exit;

use ci_yaml::{Error, Root, parse};
use tracing_subscriber::EnvFilter;

fn report(path: &str, root: &Root) {
    match serde_json::to_string_pretty(root) {
        Ok(serialized) => println!("{serialized}"),
        Err(err) => eprintln!("Failed to serialize {path}: {err}"),
    }
    for warning in root.located_warnings() {
        eprintln!("warning: {warning}");
    }
}

/// Read a build configuration and print its typed tree as JSON, followed by
/// every warning on stderr. Single parameter is the file name.
/// Set `RUST_LOG=ci_yaml=debug` to see what gets pruned and why.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = match std::env::args()
        .nth(1)
        .ok_or("This program reads a CI build configuration and prints the validated tree. \
        Expected a path to a YAML file as the first argument") {
        Ok(path) => path,
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Failed to read {path}: {err}");
            exit(2);
        }
    };

    let r: Result<Root, Error> = parse(&content);

    match r {
        Ok(root) => report(&path, &root),
        Err(err) => {
            eprintln!("{path} invalid:\n{err}");
            exit(3);
        }
    }
}
