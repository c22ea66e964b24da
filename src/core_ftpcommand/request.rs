use crate::core_ftpcommand::ftpcommand::FtpCommand;
use std::fmt;

/// One command line received on the control connection.
#[derive(Debug, Clone)]
pub struct FtpRequest {
    line: String,
    verb: String,
    argument: Option<String>,
    command: Option<FtpCommand>,
}

impl FtpRequest {
    /// Parses `VERB[ SP argument]`; the line terminator is optional.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        let (verb, argument) = match trimmed.split_once(' ') {
            Some((verb, rest)) => {
                let rest = rest.trim();
                (verb, (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (trimmed.trim_end(), None),
        };
        let verb = verb.to_ascii_uppercase();
        let command = FtpCommand::from_verb(&verb);

        Self {
            line: line.to_string(),
            verb,
            argument,
            command,
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }

    pub fn command(&self) -> Option<FtpCommand> {
        self.command
    }
}

impl fmt::Display for FtpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.command, &self.argument) {
            (Some(FtpCommand::PASS), Some(_)) => write!(f, "PASS ******"),
            (_, Some(argument)) => write!(f, "{} {}", self.verb, argument),
            (_, None) => write!(f, "{}", self.verb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verb_and_argument() {
        let request = FtpRequest::parse("dele my file.txt\r\n");
        assert_eq!(request.verb(), "DELE");
        assert_eq!(request.argument(), Some("my file.txt"));
        assert_eq!(request.command(), Some(FtpCommand::DELE));
    }

    #[test]
    fn test_parse_without_argument() {
        let request = FtpRequest::parse("NLST\r\n");
        assert_eq!(request.verb(), "NLST");
        assert!(!request.has_argument());

        let request = FtpRequest::parse("NLST   \r\n");
        assert!(request.argument().is_none());
    }

    #[test]
    fn test_unknown_verb() {
        let request = FtpRequest::parse("FOO bar");
        assert_eq!(request.verb(), "FOO");
        assert!(request.command().is_none());
    }

    #[test]
    fn test_password_is_masked() {
        let request = FtpRequest::parse("PASS secret");
        assert_eq!(request.to_string(), "PASS ******");
        assert_eq!(FtpRequest::parse("CWD /pub").to_string(), "CWD /pub");
    }
}
