//! Token substitution for static template files
//!
//! All generated text in this crate flows through one pure function:
//! template text plus an ordered list of (token, replacement) pairs.
//! Each pair is applied exactly once, left to right, replacing every
//! occurrence of its token. Tokens left over after the last pair are
//! not an error, so templates can gain optional tokens without
//! breaking older toolchains.

/// Apply `replacements` to `template`, left to right, one pass per pair.
pub fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut output = template.to_string();
    for (token, replacement) in replacements {
        output = output.replace(token, replacement);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_occurrence_of_each_token() {
        let result = substitute("NAME loves NAME", &[("NAME", "Ada")]);
        assert_eq!(result, "Ada loves Ada");
    }

    #[test]
    fn applies_pairs_in_order() {
        // The first pair may produce text matched by a later pair.
        let result = substitute("A", &[("A", "B"), ("B", "C")]);
        assert_eq!(result, "C");
    }

    #[test]
    fn leftover_tokens_are_not_an_error() {
        let result = substitute("X and FUTURE_TOKEN", &[("X", "Y")]);
        assert_eq!(result, "Y and FUTURE_TOKEN");
    }

    #[test]
    fn empty_replacement_removes_the_token() {
        let result = substitute("a<!-- OPT -->b", &[("<!-- OPT -->", "")]);
        assert_eq!(result, "ab");
    }
}
