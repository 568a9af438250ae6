use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use clap::ArgMatches;
use tracing::Level;

/// Levels unlocked by each extra `-v`; no flag keeps the ERROR default.
const VERBOSE_LEVELS: [Level; 4] = [Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE];

fn log_level(matches: &ArgMatches) -> Option<Level> {
    let count = matches
        .get_one::<u8>(commands::ARG_VERBOSE)
        .copied()
        .unwrap_or(0);

    let index = usize::from(count.checked_sub(1)?);
    VERBOSE_LEVELS
        .get(index)
        .or_else(|| VERBOSE_LEVELS.last())
        .copied()
}

/// Parse arguments, install logging and resolve the action to run.
///
/// # Errors
/// Returns an error if telemetry cannot be initialized or the arguments do not
/// describe a runnable server.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(log_level(&matches))?;

    dispatch::handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_for(args: &[&str], env: Option<&str>) -> Option<Level> {
        temp_env::with_vars(
            [
                ("USERS_API_LOG_LEVEL", env),
                ("USERS_API_JWT_SECRET", Some("s")),
            ],
            || {
                let mut argv = vec!["users-api"];
                argv.extend_from_slice(args);
                log_level(&commands::new().get_matches_from(argv))
            },
        )
    }

    #[test]
    fn no_flag_keeps_default_level() {
        assert_eq!(level_for(&[], None), None);
        assert_eq!(level_for(&[], Some("error")), None);
    }

    #[test]
    fn each_flag_raises_the_level() {
        assert_eq!(level_for(&["-v"], None), Some(Level::WARN));
        assert_eq!(level_for(&["-vv"], None), Some(Level::INFO));
        assert_eq!(level_for(&["-vvv"], None), Some(Level::DEBUG));
        assert_eq!(level_for(&["-vvvv"], None), Some(Level::TRACE));
        assert_eq!(level_for(&["-vvvvvvv"], None), Some(Level::TRACE));
    }

    #[test]
    fn env_level_name_maps_to_tracing_level() {
        assert_eq!(level_for(&[], Some("debug")), Some(Level::DEBUG));
    }
}
