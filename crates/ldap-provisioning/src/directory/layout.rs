/// Organizational unit holding provisioned users, directly below the base path.
const USERS_RDN: &str = "ou=users";

/// Where user entries live in the directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    base_path: String,
}

impl DirectoryLayout {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// One-level search base for enumerating users: `ou=users,<base>`.
    pub fn users_base(&self) -> String {
        format!("{USERS_RDN},{}", self.base_path)
    }

    /// `cn=<id>,ou=users,<base>`, with RDN special characters in `id` escaped.
    pub fn user_dn(&self, id: &str) -> String {
        format!("cn={},{}", escape_rdn_value(id), self.users_base())
    }
}

/// RFC 4514 escaping for an attribute value used inside an RDN.
fn escape_rdn_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);

    for (index, ch) in value.chars().enumerate() {
        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '#' if index == 0 => escaped.push_str("\\23"),
            ' ' if index == 0 || index == last => escaped.push_str("\\20"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_dn_follows_users_ou_convention() {
        let layout = DirectoryLayout::new("o=c_plusplus_project");
        assert_eq!(layout.users_base(), "ou=users,o=c_plusplus_project");
        assert_eq!(
            layout.user_dn("jdoe"),
            "cn=jdoe,ou=users,o=c_plusplus_project"
        );
    }

    #[test]
    fn user_dn_keeps_non_ascii_ids_verbatim() {
        let layout = DirectoryLayout::new("dc=example,dc=com");
        assert_eq!(
            layout.user_dn("zoë.müller"),
            "cn=zoë.müller,ou=users,dc=example,dc=com"
        );
    }

    #[test]
    fn escapes_rdn_special_characters() {
        assert_eq!(escape_rdn_value("a+b"), "a\\+b");
        assert_eq!(escape_rdn_value("a=b;c"), "a\\=b\\;c");
        assert_eq!(escape_rdn_value("#admin"), "\\23admin");
        assert_eq!(escape_rdn_value("admin#1"), "admin#1");
        assert_eq!(escape_rdn_value(" admin "), "\\20admin\\20");
        assert_eq!(escape_rdn_value("John Doe"), "John Doe");
    }
}
