/* 3rd party libraries */
use clap::{Arg, Command as ClapCommand};
use log::{error, info};
use std::io::{self, BufRead, Write};

/* Custom libraries */
use elevator_bank::cli::{self, Command};
use elevator_bank::config;
use elevator_bank::unwrap_or_exit;
use elevator_bank::Dispatcher;

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = ClapCommand::new("elevator_bank")
        .about("Simulates a bank of elevators served by a central dispatcher")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print elevator status as JSON"),
        )
        .get_matches();

    // Load the configuration
    let config_path = matches.value_of("config").unwrap_or("config.toml");
    let config = unwrap_or_exit!(
        config::load_config(config_path),
        "Failed to load configuration"
    );
    let json = matches.is_present("json");

    // Start the elevators
    let dispatcher = unwrap_or_exit!(
        Dispatcher::start(&config.elevator),
        "Failed to start elevator workers"
    );

    println!("{}", cli::HELP);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => match cli::execute(command, &dispatcher, json) {
                Ok(output) => println!("{}", output),
                Err(e) => println!("Error: {}", e),
            },
            Err(e) => println!("Error: {}", e),
        }
        let _ = io::stdout().flush();
    }

    info!("Shutting down");
    dispatcher.shutdown();
}
