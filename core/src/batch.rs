//! Splitting one command line into independently bound argument groups.

use crate::tokenizer::{tokenize, SEPARATOR};

/// Joins tokens into one string per `|`-delimited group.
///
/// Every separator closes the current group, so adjacent separators yield
/// empty groups. A trailing group is kept only if it has content.
///
/// # Examples
///
/// ```
/// use optline_core::{regroup, tokenize};
///
/// assert_eq!(regroup(&tokenize("-A 1 | -B 2")), vec!["-A 1", "-B 2"]);
/// assert_eq!(regroup(&tokenize("a || b")), vec!["a", "", "b"]);
/// ```
pub fn regroup(tokens: &[String]) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in tokens {
        if token == SEPARATOR {
            groups.push(current.join(" "));
            current.clear();
        } else {
            current.push(token);
        }
    }

    if !current.is_empty() {
        groups.push(current.join(" "));
    }
    groups
}

/// Tokenizes `raw` and regroups it.
pub fn regroup_str(raw: &str) -> Vec<String> {
    regroup(&tokenize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group() {
        assert_eq!(regroup_str("-A  1 -B 2"), vec!["-A 1 -B 2"]);
        assert!(regroup_str("").is_empty());
    }

    #[test]
    fn test_separator_boundaries() {
        assert_eq!(regroup_str("| -A 1"), vec!["", "-A 1"]);
        assert_eq!(regroup_str("-A 1 |"), vec!["-A 1"]);
        assert_eq!(regroup_str("||"), vec!["", ""]);
    }

    #[test]
    fn test_quoted_and_nested_separators_stay_inside() {
        assert_eq!(
            regroup_str("-t \"a | b\" -o {-x 1 | -y 2} | -n 3"),
            vec!["-t \"a | b\" -o {-x 1 | -y 2}", "-n 3"]
        );
    }
}
