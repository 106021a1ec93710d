//! Command-line argument builder for Claude CLI invocations.

use crate::types::RunConfig;
use std::ffi::OsString;

/// Builds the argument list for a `claude --print` invocation from the given
/// prompt and configuration.
#[must_use]
pub fn build_args(prompt: &str, config: &RunConfig) -> Vec<OsString> {
    let mut args = Vec::new();

    args.push(OsString::from("--print"));

    if let Some(ref model) = config.model {
        args.push(OsString::from("--model"));
        args.push(OsString::from(model));
    }

    args.push(OsString::from("--output-format"));
    args.push(OsString::from("text"));

    if config.disable_builtin_tools {
        args.push(OsString::from("--tools"));
        args.push(OsString::from(""));
    }

    if config.no_session_persistence {
        args.push(OsString::from("--no-session-persistence"));
    }

    if config.isolate_settings {
        args.push(OsString::from("--setting-sources"));
        args.push(OsString::from(""));
    }

    args.push(OsString::from(prompt));

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(config: &RunConfig) -> Vec<String> {
        build_args("test prompt", config)
            .into_iter()
            .filter_map(|s| s.into_string().ok())
            .collect()
    }

    #[test]
    fn test_default_config_is_contained() {
        let args = args_of(&RunConfig::default());

        assert_eq!(args[0], "--print");
        assert!(
            args.windows(2).any(|w| w[0] == "--tools" && w[1].is_empty()),
            "Expected '--tools \"\"' but got: {args:?}"
        );
        assert!(
            args.windows(2).any(|w| w[0] == "--setting-sources" && w[1].is_empty()),
            "Expected '--setting-sources \"\"' but got: {args:?}"
        );
        assert!(args.iter().any(|a| a == "--no-session-persistence"));
        assert!(args.windows(2).any(|w| w[0] == "--output-format" && w[1] == "text"));
        assert_eq!(args.last().map(String::as_str), Some("test prompt"));
    }

    #[test]
    fn test_model_flag() {
        let config = RunConfig {
            model: Some("sonnet".to_string()),
            ..RunConfig::default()
        };
        let args = args_of(&config);
        assert!(
            args.windows(2).any(|w| w[0] == "--model" && w[1] == "sonnet"),
            "Expected '--model sonnet' but got: {args:?}"
        );
    }

    #[test]
    fn test_uncontained_config_omits_flags() {
        let config = RunConfig {
            disable_builtin_tools: false,
            no_session_persistence: false,
            isolate_settings: false,
            ..RunConfig::default()
        };
        let args = args_of(&config);
        assert_eq!(args, ["--print", "--output-format", "text", "test prompt"]);
    }
}
