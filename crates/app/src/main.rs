// CLI modules
mod args;
mod logging;
mod op;
mod ops;
mod state;
mod version;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{ExportPublic, Init, Inspect, Keygen, Protect, Version};

command_enum! {
    (ExportPublic, ExportPublic),
    (Init, Init),
    (Inspect, Inspect),
    (Keygen, Keygen),
    (Protect, Protect),
    (Version, Version),
}

fn main() {
    let args = Args::parse();

    // Logging goes to the state directory once it exists
    let state = state::AppState::load(args.config_path.clone()).ok();
    let level = logging::resolve_level(
        args.log_level.as_deref(),
        state.as_ref().map(|s| s.config.logging.level.as_str()),
    );
    let guards = logging::init_logging(level, state.as_ref().map(|s| s.logs_dir.as_path()));

    let ctx = op::OpContext::new(args.config_path);

    let code = match args.command.execute(&ctx) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush the non-blocking writers before exiting
    drop(guards);
    std::process::exit(code);
}
