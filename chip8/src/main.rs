use std::path::PathBuf;
use std::process;
use std::time::Duration;

mod keymap;
mod run;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: {} <scale> <cycle-delay-ms> <rom>", args[0]);
        process::exit(1);
    }

    let scale: u32 = match args[1].parse() {
        Ok(scale) => scale,
        Err(_) => {
            eprintln!("invalid scale {:?}", args[1]);
            process::exit(1);
        }
    };
    let cycle_delay: u64 = match args[2].parse() {
        Ok(delay) => delay,
        Err(_) => {
            eprintln!("invalid cycle delay {:?}", args[2]);
            process::exit(1);
        }
    };

    if let Err(e) = run::run(scale, Duration::from_millis(cycle_delay), PathBuf::from(&args[3])) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
