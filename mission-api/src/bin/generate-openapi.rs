//! Write the Mission Control OpenAPI document.
//!
//! Prints to stdout, or to the path given as the first argument:
//!   cargo run -p mission-api --bin generate-openapi -- docs/openapi.json

use mission_api::ApiDoc;

fn main() -> std::io::Result<()> {
    let json = ApiDoc::to_json().map_err(std::io::Error::other)?;
    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::write(&path, format!("{json}\n"))?;
            eprintln!("OpenAPI document written to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}
