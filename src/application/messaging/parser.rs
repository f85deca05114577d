//! Command parser - Splits prefixed text into a command word and arguments

/// A parsed `prefix + command + args` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lowercased command word
    pub name: String,
    pub args: Vec<String>,
}

/// Recognizes command messages by their prefix
#[derive(Debug, Clone)]
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    pub fn is_command(&self, text: &str) -> bool {
        !self.command_prefix.is_empty() && text.starts_with(&self.command_prefix)
    }

    /// Parse a command message. Returns `None` for text without the prefix.
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        if !self.is_command(text) {
            return None;
        }

        // Strip exactly one prefix so that `..x` is the command `.x`
        let cmd_text = &text[self.command_prefix.len()..];

        let mut parts = cmd_text.split_whitespace();
        let name = parts.next().unwrap_or("").to_lowercase();
        let args = parts.map(|s| s.to_string()).collect();

        Some(ParsedCommand { name, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_args() {
        let parser = CommandParser::new(".");
        let cmd = parser.parse(".Ban  2547000   being rude").unwrap();
        assert_eq!(cmd.name, "ban");
        assert_eq!(cmd.args, vec!["2547000", "being", "rude"]);
    }

    #[test]
    fn test_parse_space_after_prefix() {
        let parser = CommandParser::new(".");
        let cmd = parser.parse(". menu").unwrap();
        assert_eq!(cmd.name, "menu");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_bare_prefix_yields_empty_command() {
        let parser = CommandParser::new(".");
        let cmd = parser.parse(".").unwrap();
        assert_eq!(cmd.name, "");
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        let parser = CommandParser::new("!");
        assert_eq!(parser.parse("hello !menu"), None);
        assert!(!parser.is_command("menu"));
    }

    #[test]
    fn test_multi_char_prefix() {
        let parser = CommandParser::new("sila ");
        let cmd = parser.parse("sila ping now").unwrap();
        assert_eq!(cmd.name, "ping");
        assert_eq!(cmd.args, vec!["now"]);
    }
}
