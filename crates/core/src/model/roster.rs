use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RosterError {
    #[error("unknown learner: {0}")]
    UnknownName(String),
}

/// Fixed set of learner names allowed to create and solve problems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Build a roster from explicit names. Blank entries and duplicates are dropped.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || out.iter().any(|n| n == name) {
                continue;
            }
            out.push(name.to_owned());
        }
        Self { names: out }
    }

    /// Parse a comma-separated list such as `"alice,bob"`.
    #[must_use]
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    #[must_use]
    pub fn is_valid(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// # Errors
    ///
    /// Returns `RosterError::UnknownName` if `name` is not on the roster.
    pub fn require(&self, name: &str) -> Result<(), RosterError> {
        if self.is_valid(name) {
            Ok(())
        } else {
            Err(RosterError::UnknownName(name.to_owned()))
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_names() {
        let roster = Roster::parse("alice, bob,,carol ,alice");
        assert_eq!(roster.names(), ["alice", "bob", "carol"]);
        assert!(roster.is_valid("bob"));
        assert!(!roster.is_valid("dave"));
    }

    #[test]
    fn empty_configuration_allows_nobody() {
        let roster = Roster::parse("");
        assert!(roster.is_empty());
        assert!(!roster.is_valid(""));
        assert_eq!(
            roster.require("").unwrap_err(),
            RosterError::UnknownName(String::new())
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        let roster = Roster::new(["Alice"]);
        assert!(roster.require("Alice").is_ok());
        assert!(roster.require("alice").is_err());
    }
}
