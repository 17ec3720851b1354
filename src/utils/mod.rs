use std::sync::LazyLock;

use regex::Regex;

static THINK_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>\s*").unwrap());

pub fn remove_think_tags(text: &str) -> String {
    THINK_TAGS.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_think_tags() {
        assert_eq!(
            remove_think_tags("<think>\nthe user is tired\n</think>\n\nRest when the baby sleeps."),
            "Rest when the baby sleeps."
        );
        assert_eq!(remove_think_tags("  plain answer \n"), "plain answer");
    }
}
