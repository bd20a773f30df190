use log::error;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io;
use std::process;
use structopt::StructOpt;
use structopt_flags::LogLevel;

use stipple_mask::app::StippleApp;
use stipple_mask::cli::Opt;

fn main() {
    let opt: Opt = Opt::from_args();

    if let Some(shell) = opt.completions {
        Opt::clap().gen_completions_to("stipple-mask", shell, &mut io::stdout());
        return;
    }

    if let Err(e) = TermLogger::init(
        opt.verbose.get_level_filter(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let config = match opt.to_app_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    if let Err(e) = StippleApp::new(config).run() {
        error!("{}", e);
        process::exit(1);
    }
}
