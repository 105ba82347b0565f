//! Parsing Options.
//! `pn-play <NET> --mode {mode}` or `-m`, plus the overrides of [`PlayConfig`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

use crate::config::PlayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// List the enabled transitions.
    Enabled,
    /// Fire the `-t` transitions one after another.
    Fire,
    /// Compose and commit one automatic step.
    Step,
    /// Automatic steps until nothing is enabled or the step limit is hit.
    Run,
}

fn make_options_parser() -> Command {
    Command::new("pn-play")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plays the token game on a Petri net description")
        .arg(
            Arg::new("net")
                .value_name("NET")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Net description, JSON or RON (.ron)"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .default_value("enabled")
                .value_parser(["enabled", "fire", "step", "run"]),
        )
        .arg(
            Arg::new("transition")
                .short('t')
                .long("transition")
                .value_name("ID")
                .action(ArgAction::Append)
                .help("Transition to fire in `fire` mode, repeatable"),
        )
        .arg(
            Arg::new("steps")
                .short('n')
                .long("steps")
                .value_parser(value_parser!(usize))
                .help("Step limit for `run` mode"),
        )
        .arg(Arg::new("seed").long("seed").value_parser(value_parser!(u64)))
        .arg(
            Arg::new("auto-concurrency")
                .long("auto-concurrency")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write the session report as JSON"),
        )
        .arg(
            Arg::new("save")
                .long("save")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write the resulting net description"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub net: PathBuf,
    pub mode: PlayMode,
    pub transitions: Vec<String>,
    pub steps: Option<usize>,
    pub seed: Option<u64>,
    pub auto_concurrency: bool,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

impl Options {
    /// The first item is the binary name.
    pub fn parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = make_options_parser().try_get_matches_from(args)?;
        let mode = match matches.get_one::<String>("mode").map(String::as_str) {
            Some("fire") => PlayMode::Fire,
            Some("step") => PlayMode::Step,
            Some("run") => PlayMode::Run,
            _ => PlayMode::Enabled,
        };

        Ok(Options {
            net: matches.get_one::<PathBuf>("net").cloned().unwrap_or_default(),
            mode,
            transitions: matches
                .get_many::<String>("transition")
                .map(|ids| ids.cloned().collect())
                .unwrap_or_default(),
            steps: matches.get_one::<usize>("steps").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            auto_concurrency: matches.get_flag("auto-concurrency"),
            config: matches.get_one::<PathBuf>("config").cloned(),
            output: matches.get_one::<PathBuf>("output").cloned(),
            save: matches.get_one::<PathBuf>("save").cloned(),
        })
    }

    /// Command-line values win over the configuration file.
    pub fn apply_to(&self, config: &mut PlayConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(steps) = self.steps {
            config.max_steps = steps;
        }
        if self.auto_concurrency {
            config.auto_concurrency = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_mode_collects_transitions() {
        let options =
            Options::parse_from(["pn-play", "net.json", "-m", "fire", "-t", "t1", "-t", "t2"])
                .unwrap();
        assert_eq!(options.mode, PlayMode::Fire);
        assert_eq!(options.net, PathBuf::from("net.json"));
        assert_eq!(options.transitions, vec!["t1", "t2"]);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Options::parse_from(["pn-play", "net.json", "-m", "replay"]).is_err());
        assert!(Options::parse_from(["pn-play"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let options = Options::parse_from([
            "pn-play",
            "net.json",
            "--seed",
            "3",
            "-n",
            "12",
            "--auto-concurrency",
        ])
        .unwrap();
        let mut config = PlayConfig::default();
        options.apply_to(&mut config);

        assert_eq!(config.seed, Some(3));
        assert_eq!(config.max_steps, 12);
        assert!(config.auto_concurrency);
    }
}
