//! Small command-line helpers shared by the binder, the engine and hosts.

use crate::tokenizer::OPTION_PREFIX;

/// Returns `true` if the token names an option (`-name`, `--name`).
pub fn is_option_reference(token: &str) -> bool {
    token.starts_with(OPTION_PREFIX)
}

/// Compares a token with an option keyword, ignoring leading/trailing `-` and case.
///
/// # Examples
///
/// ```
/// use optline_core::option_equals;
///
/// assert!(option_equals("--Version", "version"));
/// assert!(option_equals("help", "help"));
/// assert!(!option_equals("-helper", "help"));
/// ```
pub fn option_equals(token: &str, keyword: &str) -> bool {
    token.trim_matches(OPTION_PREFIX).eq_ignore_ascii_case(keyword)
}

/// Builds an alias from the initials of a hyphen-separated command name.
///
/// # Examples
///
/// ```
/// use optline_core::create_alias_from_command;
///
/// assert_eq!(create_alias_from_command("remove-all-files"), "raf");
/// assert_eq!(create_alias_from_command("-list-"), "l");
/// ```
pub fn create_alias_from_command(command: &str) -> String {
    command
        .split(OPTION_PREFIX)
        .map(str::trim)
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Returns the first word of a command line unless it is an option.
///
/// # Examples
///
/// ```
/// use optline_core::peek_command;
///
/// assert_eq!(peek_command("  copy -s a"), "copy");
/// assert_eq!(peek_command("-s a"), "");
/// ```
pub fn peek_command(command_line: &str) -> &str {
    let trimmed = command_line.trim_start();
    if trimmed.starts_with(OPTION_PREFIX) {
        return "";
    }
    trimmed.split_whitespace().next().unwrap_or_default()
}

/// Drops the executable path from a full process command line.
///
/// A quoted path (`"C:\My App\app.exe" -n 1`) is skipped up to its closing
/// quote; otherwise everything up to the first space is the path.
///
/// # Examples
///
/// ```
/// use optline_core::strip_program_path;
///
/// assert_eq!(strip_program_path("/usr/bin/app run -n 1"), "run -n 1");
/// assert_eq!(strip_program_path("\"/opt/my app/app\"  run"), "run");
/// assert_eq!(strip_program_path("/usr/bin/app"), "");
/// ```
pub fn strip_program_path(command_line: &str) -> &str {
    if let Some(quoted) = command_line.strip_prefix('"') {
        return match quoted.find('"') {
            Some(end) => quoted[end + 1..].trim(),
            None => "",
        };
    }

    match command_line.find(' ') {
        Some(space) => command_line[space + 1..].trim(),
        None => "",
    }
}

/// Finds `-name value` in `args`, removes both tokens and returns the value.
///
/// The name matches case-insensitively after a single `-`. An occurrence
/// followed by another option is skipped; a trailing occurrence with no value
/// ends the search.
///
/// # Examples
///
/// ```
/// use optline_core::try_get_and_remove_argument;
///
/// let mut args: Vec<String> = ["run", "-Profile", "dev", "-n", "1"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// assert_eq!(try_get_and_remove_argument(&mut args, "profile").as_deref(), Some("dev"));
/// assert_eq!(args, vec!["run", "-n", "1"]);
/// ```
pub fn try_get_and_remove_argument(args: &mut Vec<String>, name: &str) -> Option<String> {
    for i in 0..args.len() {
        let Some(arg_name) = args[i].strip_prefix(OPTION_PREFIX) else {
            continue;
        };
        if !arg_name.eq_ignore_ascii_case(name) {
            continue;
        }

        let has_value = match args.get(i + 1) {
            None => return None,
            Some(next) => !is_option_reference(next),
        };
        if has_value {
            let value = args.remove(i + 1);
            args.remove(i);
            return Some(value);
        }
    }
    None
}

/// Strips one pair of surrounding braces.
///
/// # Examples
///
/// ```
/// use optline_core::unwrap_bracket;
///
/// assert_eq!(unwrap_bracket("{-a 1}"), "-a 1");
/// assert_eq!(unwrap_bracket("{}"), "");
/// assert_eq!(unwrap_bracket("-a 1"), "-a 1");
/// ```
pub fn unwrap_bracket(text: &str) -> &str {
    text.strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(text)
}

/// Strips one pair of surrounding double quotes.
pub fn try_unwrap_double_quote(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
