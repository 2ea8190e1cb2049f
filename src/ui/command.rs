use std::path::PathBuf;
use std::str::FromStr;
use unsegen::input::*;

use nom::{
    character::complete::{alpha1, space0, space1},
    combinator::{all_consuming, opt, rest},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use super::context::{Context, Mode};
use crate::config::Density;
use crate::error::{Error, ErrorKind};

pub struct CommandParser<'a> {
    context: &'a mut Context,
}

/// Splits a command line into its name and the optional rest.
fn parse_command(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    all_consuming(delimited(
        space0,
        tuple((alpha1, opt(preceded(space1, rest)))),
        space0,
    ))(input)
}

fn usage(name: &str) -> Error {
    Error::new(
        ErrorKind::InputValidation,
        &format!("Missing argument for '{}'.", name),
    )
}

impl<'a> CommandParser<'a> {
    pub fn new(context: &'a mut Context) -> Self {
        CommandParser { context }
    }

    pub fn run_command(&mut self, cmd: &str) -> ActionResult {
        let (_, (name, arg)) = parse_command(cmd).map_err(|_| {
            Error::new(ErrorKind::InputValidation, &format!("Invalid command '{}'.", cmd))
        })?;
        let arg = arg.map(str::trim).filter(|a| !a.is_empty());

        let (_, act) = COMMANDS
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InputValidation,
                    &format!("Unknown command '{}'.", name),
                )
            })?;

        match (act, arg) {
            (Action::Arg(a), Some(arg)) => a(self.context, arg.to_owned()),
            (Action::Arg(_), None) => Err(usage(name)),
            (Action::OptArg(a), arg) => a(self.context, arg.map(str::to_owned)),
            (Action::NoArg(a), None) => a(self.context),
            (Action::NoArg(_), Some(_)) => Err(Error::new(
                ErrorKind::InputValidation,
                &format!("'{}' takes no argument.", name),
            )),
        }
    }

    fn report_error(&mut self, error: Error) {
        log::debug!("Command failed: {}", error);
        let Error { kind, message } = error;
        let message = message.unwrap_or_else(|| kind.as_str());
        self.context.controller_mut().set_status(message);
    }
}

impl Behavior for CommandParser<'_> {
    fn input(mut self, input: Input) -> Option<Input> {
        if let Event::Key(key) = input.event {
            match key {
                Key::Char('\n') => {
                    let cmd = self.context.command_line.finish_line().to_owned();
                    if let Err(e) = self.run_command(&cmd) {
                        self.report_error(e);
                    } else {
                        self.context.mode = Mode::Normal;
                    }
                    None
                }
                _ => Some(input),
            }
        } else {
            Some(input)
        }
    }
}

pub type ActionResult = crate::error::Result<()>;

pub enum Action {
    Arg(fn(&mut Context, String) -> ActionResult),
    OptArg(fn(&mut Context, Option<String>) -> ActionResult),
    NoArg(fn(&mut Context) -> ActionResult),
}

// Controller failures already end up on the status line, so only syntax
// errors are returned from here.
const COMMANDS: &[(&'static str, Action)] = &[
    (
        "year",
        Action::Arg(|c, year| {
            c.apply_year(&year);
            Ok(())
        }),
    ),
    (
        "size",
        Action::Arg(|c, size| {
            c.set_density(Density::from_str(&size)?);
            Ok(())
        }),
    ),
    (
        "export",
        Action::OptArg(|c, dir| {
            c.export(dir.map(PathBuf::from));
            Ok(())
        }),
    ),
    (
        "import",
        Action::Arg(|c, path| {
            c.import(PathBuf::from(path));
            Ok(())
        }),
    ),
    (
        "print",
        Action::OptArg(|c, path| {
            c.print(path.map(PathBuf::from));
            Ok(())
        }),
    ),
    (
        "q",
        Action::NoArg(|c| {
            c.quit = true;
            Ok(())
        }),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::control::Controller;
    use crate::date::DateKey;
    use crate::store::{MemoryStorage, Schedule, Shift};
    use std::fs;

    fn context(storage: &MemoryStorage, export_dir: Option<PathBuf>) -> Context {
        let config = Config {
            export_dir,
            ..Config::default()
        };
        let controller = Controller::new(
            Schedule::new(Box::new(storage.clone())),
            2024,
            "2024-02-14".parse().unwrap(),
        );
        Context::new(&config, controller)
    }

    fn run(context: &mut Context, cmd: &str) -> ActionResult {
        CommandParser::new(context).run_command(cmd)
    }

    #[test]
    fn splits_name_and_argument() {
        assert_eq!(parse_command("year 2030"), Ok(("", ("year", Some("2030")))));
        assert_eq!(parse_command("q"), Ok(("", ("q", None))));
        assert_eq!(
            parse_command("import /tmp/a b.json"),
            Ok(("", ("import", Some("/tmp/a b.json"))))
        );
        assert!(parse_command("2030").is_err());
    }

    #[test]
    fn year_command_switches_year() {
        let storage = MemoryStorage::default();
        let mut ctx = context(&storage, None);

        run(&mut ctx, "year 2030").unwrap();
        assert_eq!(ctx.controller().year(), 2030);
        assert_eq!(ctx.controller().status(), Some("Showing year 2030."));
        assert_eq!(ctx.cursor.to_string(), "2030-02-14");
    }

    #[test]
    fn out_of_range_year_keeps_display() {
        let storage = MemoryStorage::default();
        let mut ctx = context(&storage, None);

        run(&mut ctx, "year 3000").unwrap();
        assert_eq!(ctx.controller().year(), 2024);
        assert_eq!(
            ctx.controller().status(),
            Some("Enter a valid year between 1900 and 2100.")
        );
    }

    #[test]
    fn size_command_changes_density() {
        let storage = MemoryStorage::default();
        let mut ctx = context(&storage, None);

        run(&mut ctx, "size small").unwrap();
        assert_eq!(ctx.density(), Density::Small);
        assert!(run(&mut ctx, "size huge").is_err());
        assert_eq!(ctx.density(), Density::Small);
    }

    #[test]
    fn missing_and_unknown() {
        let storage = MemoryStorage::default();
        let mut ctx = context(&storage, None);

        assert!(run(&mut ctx, "year").is_err());
        assert!(run(&mut ctx, "frobnicate").is_err());
        assert!(run(&mut ctx, "q now").is_err());
        assert!(!ctx.quit);

        run(&mut ctx, "q").unwrap();
        assert!(ctx.quit);
    }

    #[test]
    fn export_and_import_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::default();
        let mut ctx = context(&storage, Some(dir.path().to_owned()));

        ctx.gesture(
            crate::control::Gesture::Primary,
            crate::control::Modifiers::default(),
        );
        run(&mut ctx, "export").unwrap();

        let exported = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .find(|p| p.extension().map_or(false, |e| e == "json"))
            .unwrap();

        let other = MemoryStorage::default();
        let mut fresh = context(&other, None);
        run(&mut fresh, &format!("import {}", exported.display())).unwrap();

        assert_eq!(
            fresh.controller().status(),
            Some("Schedule imported successfully.")
        );
        let key: DateKey = "2024-02-14".parse().unwrap();
        assert_eq!(
            fresh.controller().schedule().get(&key).map(|r| r.shift),
            Some(Shift::Day)
        );
    }

    #[test]
    fn import_of_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::default();
        let mut ctx = context(&storage, None);

        let path = dir.path().join("missing.json");
        run(&mut ctx, &format!("import {}", path.display())).unwrap();
        assert_eq!(ctx.controller().status(), Some("Error: import failed."));
    }

    #[test]
    fn print_writes_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::default();
        let mut ctx = context(&storage, None);

        let path = dir.path().join("year.txt");
        run(&mut ctx, &format!("print {}", path.display())).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("February 2024"));
    }
}
