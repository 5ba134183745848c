/// Approximate token count of a source span
///
/// Blank and comment lines are cheaper (one token per six characters) than
/// code lines (one per four). The result is never below 1.
#[must_use]
pub fn estimate_tokens(content: &str, comment_prefixes: &[&str]) -> usize {
    let total: usize = content
        .lines()
        .map(|line| {
            let chars = line.chars().count();
            let trimmed = line.trim_start();
            let is_comment = comment_prefixes
                .iter()
                .any(|prefix| trimmed.starts_with(prefix));
            if trimmed.is_empty() || is_comment {
                chars.div_ceil(6)
            } else {
                chars.div_ceil(4)
            }
        })
        .sum();

    total.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLASHES: &[&str] = &["//"];

    #[test]
    fn empty_content_costs_one_token() {
        assert_eq!(estimate_tokens("", SLASHES), 1);
        assert_eq!(estimate_tokens("\n\n\n", SLASHES), 1);
    }

    #[test]
    fn code_lines_cost_a_quarter() {
        // 9 chars -> ceil(9/4) = 3
        assert_eq!(estimate_tokens("let x = 1", SLASHES), 3);
    }

    #[test]
    fn comment_lines_cost_a_sixth() {
        // 12 chars -> ceil(12/6) = 2
        assert_eq!(estimate_tokens("// a comment", SLASHES), 2);
        // indented comment still counts as comment, 14 chars -> 3
        assert_eq!(estimate_tokens("  // a comment", SLASHES), 3);
    }

    #[test]
    fn whitespace_only_lines_cost_a_sixth() {
        // 7 spaces -> ceil(7/6) = 2
        assert_eq!(estimate_tokens("       ", SLASHES), 2);
    }

    #[test]
    fn lines_are_summed() {
        let content = "fn a() {}\n// note\n";
        // "fn a() {}" 9 -> 3, "// note" 7 -> 2
        assert_eq!(estimate_tokens(content, SLASHES), 5);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 4 chars, 8 bytes
        assert_eq!(estimate_tokens("ñañá", SLASHES), 1);
    }
}
