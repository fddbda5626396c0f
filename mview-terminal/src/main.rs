/// mview Terminal - STL model viewer
///
/// Controls:
///   - WASD / Arrow Keys: Orbit the model
///   - +/-: Dolly in and out
///   - Letter pairs (f/F, m/M, ...): Adjust display settings
///   - Q/ESC: Quit

use log::{error, info};
use mview_terminal::cli::{parse_args, HELP};
use mview_terminal::{AppError, TerminalApp};

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("{}", err);
        eprintln!("mview-terminal: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let options = parse_args(pico_args::Arguments::from_env())?;
    if options.help {
        print!("{}", HELP);
        return Ok(());
    }

    info!(
        "starting with model {} and environment {}",
        options.config.model, options.config.hdri
    );

    let mut app = TerminalApp::new(options.config)?;
    app.run()?;

    let viewer = app.viewer().borrow();
    for (asset, state) in [
        ("mesh", &viewer.load_status().mesh),
        ("environment map", &viewer.load_status().environment),
    ] {
        if let mview_core::LoadState::Failed(reason) = state {
            eprintln!("mview-terminal: {} was not loaded: {}", asset, reason);
        }
    }

    Ok(())
}
