use serde::{Deserialize, Serialize};

/// One validated row of an import batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    id: String,
    full_name: String,
    phone_number: String,
    email: String,
    department: String,
    job_description: String,
}

/// `full_name` split for the `givenName` and `sn` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub given_name: String,
    pub surname: String,
}

impl CandidateRecord {
    /// Returns `None` when `id` is empty. Values are kept verbatim.
    pub fn new(
        id: impl Into<String>,
        full_name: impl Into<String>,
        phone_number: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
        job_description: impl Into<String>,
    ) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id,
            full_name: full_name.into(),
            phone_number: phone_number.into(),
            email: email.into(),
            department: department.into(),
            job_description: job_description.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    /// First whitespace-delimited token as given name, the trimmed remainder
    /// (possibly empty) as surname.
    pub fn parsed_name(&self) -> ParsedName {
        let name = self.full_name.trim_start();
        let (given_name, surname) = match name.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (name, ""),
        };

        ParsedName {
            given_name: given_name.to_string(),
            surname: surname.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_name(full_name: &str) -> CandidateRecord {
        CandidateRecord::new("u1", full_name, "", "", "", "").expect("valid record")
    }

    #[test]
    fn splits_first_token_from_remainder() {
        let name = with_name("Mary Ann  Smith").parsed_name();
        assert_eq!(name.given_name, "Mary");
        assert_eq!(name.surname, "Ann  Smith");
    }

    #[test]
    fn single_token_leaves_surname_empty() {
        let name = with_name("Cher").parsed_name();
        assert_eq!(name.given_name, "Cher");
        assert_eq!(name.surname, "");
    }

    #[test]
    fn leading_whitespace_is_skipped() {
        let name = with_name("  Alan\tTuring ").parsed_name();
        assert_eq!(name.given_name, "Alan");
        assert_eq!(name.surname, "Turing");
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(CandidateRecord::new("", "Nobody", "", "", "", "").is_none());
    }
}
