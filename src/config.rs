use std::path::PathBuf;

use color_namer::Query;
use thiserror::Error;

/// Environment variable naming an alternate reference table.
pub const TABLE_ENV: &str = "COLOR_TABLE";

pub const DEFAULT_LIST_LEN: usize = 5;

pub const USAGE: &str = "\
usage: color-namer [--table PATH] [--strict] [--json] <IMAGE> <X> <Y>
       color-namer [--table PATH] [--strict] [--json] --rgb <R> <G> <B>
       color-namer [--table PATH] [--json] --list [N]

  --table PATH  reference CSV (name,r,g,b,hex); defaults to $COLOR_TABLE, then the built-in table
  --strict      reject channels outside 0..=255 and answer \"Unknown\" instead of clamping
  --json        print the result as JSON
  --list [N]    print the first N reference colors (default 5)";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} needs a value")]
    MissingValue(&'static str),
    #[error("unknown option {0:?}")]
    UnknownFlag(String),
    #[error("{what} must be {kind}, got {value:?}")]
    InvalidNumber {
        what: &'static str,
        kind: &'static str,
        value: String,
    },
    #[error("expected {expected}, got {got} argument(s)")]
    Arity { expected: &'static str, got: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Sample a pixel of a decoded image.
    Pixel { image: PathBuf, x: u32, y: u32 },
    Rgb(Query),
    List(usize),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table: Option<PathBuf>,
    pub strict: bool,
    pub json: bool,
    pub target: Target,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_table = std::env::var_os(TABLE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self::from_args(std::env::args().skip(1), env_table)
    }

    /// `args` excludes the program name. `--table` wins over `env_table`.
    pub fn from_args<I, S>(args: I, env_table: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = None;
        let mut strict = false;
        let mut json = false;
        let mut rgb = false;
        let mut list = false;
        let mut help = false;
        let mut positional = Vec::new();

        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--table" => table = Some(PathBuf::from(args.next().ok_or(ConfigError::MissingValue("--table"))?)),
                "--strict" => strict = true,
                "--json" => json = true,
                "--rgb" => rgb = true,
                "--list" => list = true,
                "-h" | "--help" => help = true,
                flag if flag.starts_with("--") => return Err(ConfigError::UnknownFlag(flag.to_string())),
                // single dash is left positional so negative channels parse
                _ => positional.push(arg),
            }
        }

        let target = if help {
            Target::Help
        } else if list {
            match positional.as_slice() {
                [] => Target::List(DEFAULT_LIST_LEN),
                [n] => Target::List(parse("N", "a count", n)?),
                _ => return Err(ConfigError::Arity { expected: "at most one count after --list", got: positional.len() }),
            }
        } else if rgb {
            match positional.as_slice() {
                [r, g, b] => Target::Rgb(Query::new(parse("R", "an integer", r)?, parse("G", "an integer", g)?, parse("B", "an integer", b)?)),
                _ => return Err(ConfigError::Arity { expected: "R G B after --rgb", got: positional.len() }),
            }
        } else {
            match positional.as_slice() {
                [image, x, y] => Target::Pixel {
                    image: PathBuf::from(image),
                    x: parse("X", "a pixel column", x)?,
                    y: parse("Y", "a pixel row", y)?,
                },
                _ => return Err(ConfigError::Arity { expected: "IMAGE X Y", got: positional.len() }),
            }
        };

        Ok(Self {
            table: table.or(env_table),
            strict,
            json,
            target,
        })
    }
}

fn parse<T: std::str::FromStr>(what: &'static str, kind: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        what,
        kind,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Result<Config, ConfigError> {
        Config::from_args(args.iter().copied(), None)
    }

    #[test]
    fn pixel_mode() {
        let c = parse_args(&["photo.png", "12", "40"]).unwrap();
        assert_eq!(c.target, Target::Pixel { image: "photo.png".into(), x: 12, y: 40 });
        assert!(!c.strict && !c.json);
        assert_eq!(c.table, None);
    }

    #[test]
    fn rgb_mode_accepts_negative_channels() {
        let c = parse_args(&["--strict", "--rgb", "-5", "300", "7"]).unwrap();
        assert_eq!(c.target, Target::Rgb(Query::new(-5, 300, 7)));
        assert!(c.strict);
    }

    #[test]
    fn list_mode() {
        assert_eq!(parse_args(&["--list"]).unwrap().target, Target::List(DEFAULT_LIST_LEN));
        assert_eq!(parse_args(&["--list", "12"]).unwrap().target, Target::List(12));
    }

    #[test]
    fn table_flag_beats_environment() {
        let c = Config::from_args(["--table", "mine.csv", "--list"], Some("env.csv".into())).unwrap();
        assert_eq!(c.table, Some("mine.csv".into()));
        let c = Config::from_args(["--list"], Some("env.csv".into())).unwrap();
        assert_eq!(c.table, Some("env.csv".into()));
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse_args(&["--help", "junk"]).unwrap().target, Target::Help);
    }

    #[test]
    fn reports_bad_arguments() {
        assert_eq!(parse_args(&["--table"]), Err(ConfigError::MissingValue("--table")));
        assert_eq!(parse_args(&["--verbose"]), Err(ConfigError::UnknownFlag("--verbose".into())));
        assert!(matches!(parse_args(&["img.png", "-1", "0"]), Err(ConfigError::InvalidNumber { what: "X", .. })));
        assert!(matches!(parse_args(&["--rgb", "1", "2"]), Err(ConfigError::Arity { got: 2, .. })));
        assert!(matches!(parse_args(&[]), Err(ConfigError::Arity { got: 0, .. })));
    }
}
