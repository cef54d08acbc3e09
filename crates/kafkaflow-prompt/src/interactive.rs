//! Interactivity predicate
//!
//! Evaluated on every call: a prompt is interactive only when stdin is a
//! terminal, no automation marker is set in the environment, and the
//! command line does not opt out with `--no-interaction`.

use std::ffi::OsStr;
use std::io::IsTerminal;

/// Environment variables whose presence marks a CI or test-runner process
pub const AUTOMATION_MARKERS: [&str; 3] = ["CI", "NEXTEST", "KAFKAFLOW_NON_INTERACTIVE"];

pub const NO_INTERACTION_FLAG: &str = "--no-interaction";

pub fn is_interactive() -> bool {
    evaluate(
        std::io::stdin().is_terminal(),
        |key| std::env::var_os(key).is_some(),
        std::env::args_os(),
    )
}

/// True when any automation marker is present in the process environment
pub fn environment_is_automated() -> bool {
    AUTOMATION_MARKERS
        .iter()
        .any(|key| std::env::var_os(key).is_some())
}

/// Arguments are compared as OS strings and need not be valid UTF-8
pub fn evaluate<I, S>(stdin_is_terminal: bool, env_has: impl Fn(&str) -> bool, args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    if !stdin_is_terminal {
        return false;
    }
    if AUTOMATION_MARKERS.iter().any(|key| env_has(key)) {
        return false;
    }
    let flag = OsStr::new(NO_INTERACTION_FLAG);
    !args.into_iter().any(|arg| arg.as_ref() == flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn no_env(_: &str) -> bool {
        false
    }

    #[test]
    fn test_terminal_without_markers_is_interactive() {
        assert!(evaluate(true, no_env, ["kafkaflow", "profiles", "list"]));
    }

    #[test]
    fn test_piped_stdin_is_not_interactive() {
        assert!(!evaluate(false, no_env, ["kafkaflow"]));
    }

    #[test]
    fn test_no_interaction_flag() {
        assert!(!evaluate(true, no_env, ["kafkaflow", "--no-interaction", "profiles"]));
        assert!(evaluate(true, no_env, ["kafkaflow", "--no-interactions"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_arguments_are_tolerated() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let config_dir = OsString::from_vec(b"cfg\xff".to_vec());
        let args = vec![
            OsString::from("kafkaflow"),
            OsString::from("--config-dir"),
            config_dir.clone(),
            OsString::from("profiles"),
        ];
        assert!(evaluate(true, no_env, args));

        let args = vec![
            OsString::from("kafkaflow"),
            config_dir,
            OsString::from(NO_INTERACTION_FLAG),
        ];
        assert!(!evaluate(true, no_env, args));
    }

    #[test]
    fn test_each_marker_disables_prompts() {
        for marker in AUTOMATION_MARKERS {
            assert!(!evaluate(true, |key| key == marker, ["kafkaflow"]), "{}", marker);
        }
    }

    #[test]
    #[serial]
    fn test_environment_markers_read_from_process_env() {
        temp_env::with_vars_unset(AUTOMATION_MARKERS, || {
            assert!(!environment_is_automated());
        });

        temp_env::with_vars_unset(AUTOMATION_MARKERS, || {
            temp_env::with_var("CI", Some("true"), || {
                assert!(environment_is_automated());
            });
        });

        temp_env::with_vars_unset(AUTOMATION_MARKERS, || {
            temp_env::with_var("KAFKAFLOW_NON_INTERACTIVE", Some("1"), || {
                assert!(environment_is_automated());
                assert!(!is_interactive());
            });
        });
    }
}
