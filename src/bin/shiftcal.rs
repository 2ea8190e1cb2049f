extern crate shiftcal as lib;

use chrono::{Datelike, Local};
use flexi_logger::{FileSpec, Logger};
use lib::backup;
use lib::control::{self, Controller};
use lib::events::Dispatcher;
use lib::store::{FileStorage, Schedule};
use lib::ui::app::App;
use nix::sys::termios;
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(name = "shiftcal", about = "Shiftcal - A TUI shift calendar.")]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    #[structopt(short = "y", long = "year", help = "year to show")]
    pub year: Option<String>,

    #[structopt(
        short = "p",
        long = "print",
        help = "print the year to stdout and exit"
    )]
    pub print: bool,

    #[structopt(
        long = "export",
        help = "write a JSON backup into DIR and exit",
        parse(from_os_str)
    )]
    pub export: Option<PathBuf>,

    #[structopt(
        long = "import",
        help = "replace the schedule with a JSON backup and exit",
        parse(from_os_str)
    )]
    pub import: Option<PathBuf>,
}

impl Args {
    fn headless(&self) -> bool {
        self.print || self.export.is_some() || self.import.is_some()
    }
}

fn run_headless(args: &Args, controller: &mut Controller) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &args.import {
        let result = controller.import(backup::read_import_file(path));
        eprintln!("{}", controller.status().unwrap_or_default());
        result?;
    }

    if let Some(dir) = &args.export {
        let result = controller.export(dir, Local::now().date_naive());
        eprintln!("{}", controller.status().unwrap_or_default());
        result?;
    }

    if args.print {
        print!(
            "{}",
            lib::print::year_to_text(controller.calendar(), controller.density())
        );
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = &args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    let today = lib::date::today().clone();
    log::debug!("Today is {}", today);

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let storage = FileStorage::new(&config.storage_path());
    log::info!("Using schedule at '{}'", storage.path().display());
    let schedule = Schedule::load_from(Box::new(storage));

    let current_year = Local::now().year();
    let year = match args.year.as_deref().map(control::parse_year) {
        None => current_year,
        Some(Ok(year)) => year,
        Some(Err(e)) => {
            log::warn!("Ignoring --year: {}", e);
            eprintln!("{}", e.message.as_deref().unwrap_or("invalid year"));
            current_year
        }
    };

    let mut controller = Controller::new(schedule, year, today).with_density(config.density);

    if args.headless() {
        return run_headless(&args, &mut controller);
    }

    const STDOUT: std::os::unix::io::RawFd = 0;
    let orig_attr = std::sync::Mutex::new(
        termios::tcgetattr(STDOUT).expect("Failed to get terminal attributes"),
    );

    std::panic::set_hook(Box::new(move |info| {
        // Switch to main terminal screen
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDOUT, termios::SetArg::TCSANOW, &attr);
        }

        println!("Shiftcal ran into a fatal error!");
        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let dispatcher = Dispatcher::from_config(&config);
    // Setup unsegen terminal
    let stdout = stdout();
    let term = Terminal::new(stdout.lock())?;

    let mut app = App::new(&config, controller);

    app.run(dispatcher, term)
}
