//! Command-line parsing.

use std::path::PathBuf;

use anyhow::{Context, bail};

pub const USAGE: &str = "\
Usage: qsfm [OPTIONS] <COMMAND>

Commands:
  ls [path]               List the current directory, or navigate to <path> first
  cd <name>               Enter a directory of the current listing
  up <index>              Jump to breadcrumb <index> (0 = first segment)
  stat <name>             Show metadata of a file in the current directory
  mkdir <name>            Create a directory in the current directory
  upload <files...>       Upload local files into the current directory
  download <name> <dest>  Download a file of the current directory to <dest>
  whoami                  Show the signed-in user

Options:
  -s, --server <URL>      Server base URL (env: QSFM_SERVER_URL)
  -u, --user <NAME>       User name (env: QSFM_USER)
  -p, --password <PWD>    Password (env: QSFM_PASSWORD)
  -c, --config <FILE>     Configuration file
      --retries <N>       Resume failed uploads up to N times (default 0)
  -h, --help              Print this help";

/// Pulls flags out of an argument list, leaving the positionals.
pub struct ArgParser {
    args: Vec<String>,
}

impl ArgParser {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1).collect())
    }

    pub fn wants_help(&self) -> bool {
        self.args.iter().any(|a| a == "--help" || a == "-h")
    }

    /// Removes `<name> <value>` and returns the value.
    pub fn take_value(&mut self, names: &[&str]) -> anyhow::Result<Option<String>> {
        let Some(i) = self.args.iter().position(|a| names.contains(&a.as_str())) else {
            return Ok(None);
        };
        if i + 1 >= self.args.len() {
            bail!("missing value for {}", self.args[i]);
        }
        let mut taken = self.args.drain(i..=i + 1);
        taken.next();
        Ok(taken.next())
    }

    pub fn remaining(self) -> Vec<String> {
        self.args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls { path: Option<String> },
    Cd { name: String },
    Up { index: usize },
    Stat { name: String },
    Mkdir { name: String },
    Upload { files: Vec<PathBuf> },
    Download { name: String, dest: PathBuf },
    Whoami,
}

impl Command {
    pub fn parse(positionals: Vec<String>) -> anyhow::Result<Self> {
        let mut it = positionals.into_iter();
        let Some(cmd) = it.next() else {
            bail!("no command given");
        };
        let rest: Vec<String> = it.collect();

        let command = match (cmd.as_str(), rest.as_slice()) {
            ("ls", []) => Self::Ls { path: None },
            ("ls", [path]) => Self::Ls {
                path: Some(path.clone()),
            },
            ("cd", [name]) => Self::Cd { name: name.clone() },
            ("up", [index]) => Self::Up {
                index: index
                    .parse()
                    .with_context(|| format!("invalid breadcrumb index: {index}"))?,
            },
            ("stat", [name]) => Self::Stat { name: name.clone() },
            ("mkdir", [name]) => Self::Mkdir { name: name.clone() },
            ("upload", files) if !files.is_empty() => Self::Upload {
                files: files.iter().map(PathBuf::from).collect(),
            },
            ("download", [name, dest]) => Self::Download {
                name: name.clone(),
                dest: PathBuf::from(dest),
            },
            ("whoami", []) => Self::Whoami,
            _ => bail!("invalid command line: {cmd} {}", rest.join(" ")),
        };
        Ok(command)
    }
}

/// Everything parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub server: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub config: Option<PathBuf>,
    pub retries: u32,
    pub command: Command,
}

impl Cli {
    pub fn parse(mut parser: ArgParser) -> anyhow::Result<Self> {
        let server = parser.take_value(&["--server", "-s"])?;
        let user = parser.take_value(&["--user", "-u"])?;
        let password = parser.take_value(&["--password", "-p"])?;
        let config = parser.take_value(&["--config", "-c"])?.map(PathBuf::from);
        let retries = match parser.take_value(&["--retries"])? {
            Some(n) => n
                .parse()
                .with_context(|| format!("invalid retry count: {n}"))?,
            None => 0,
        };
        let command = Command::parse(parser.remaining())?;
        Ok(Self {
            server,
            user,
            password,
            config,
            retries,
            command,
        })
    }
}
