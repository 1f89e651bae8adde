//! tcping - Main CLI Application
//!
//! Probes a TCP endpoint once per second and reports availability
//! statistics until interrupted or the probe count is reached.

use clap::Parser;
use std::process;
use tcping::{app::App, cli::Cli};

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue at: https://github.com/pouriyajamshidi/tcping/issues");
        process::exit(1);
    }));

    let cli = Cli::parse();

    // The keypress watcher thread blocks on stdin, exit explicitly
    process::exit(App::new(cli).run().await);
}
