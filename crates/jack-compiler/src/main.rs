//! Jack Compiler CLI
//!
//! Compiles a `.jack` file, or every `*.jack` file in a directory
//! (non-recursively), to sibling `.vm` files.

use clap::Parser as ClapParser;
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jack compiler - translate .jack source to VM instructions", long_about = None)]
struct Cli {
    /// A .jack file, or a directory to scan for .jack files (non-recursive)
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    for outcome in jackc::compile_path(&cli.path) {
        match outcome.result {
            Ok(()) => println!("Compiled: {}", outcome.name),
            Err(message) => println!("Error in {}: {}", outcome.name, message),
        }
    }
}
