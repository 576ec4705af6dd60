use super::AttributeMap;
use crate::workflows::provisioning::CandidateRecord;
use serde::Serialize;

/// Object classes written on every provisioned user.
pub const USER_OBJECT_CLASSES: [&str; 4] = [
    "inetOrgPerson",
    "organizationalPerson",
    "person",
    "top",
];

/// Attributes shown when a user is displayed, in display order.
pub const USER_DISPLAY_ATTRIBUTES: [&str; 7] = [
    "cn",
    "sn",
    "givenName",
    "mail",
    "ou",
    "telephoneNumber",
    "description",
];

/// Attribute set for the add request creating `record`.
pub fn user_attributes(record: &CandidateRecord) -> Vec<(&'static str, Vec<String>)> {
    let name = record.parsed_name();

    vec![
        ("cn", vec![record.id().to_string()]),
        ("sn", vec![name.surname]),
        ("givenName", vec![name.given_name]),
        ("mail", vec![record.email().to_string()]),
        (
            "objectClass",
            USER_OBJECT_CLASSES.iter().map(|class| class.to_string()).collect(),
        ),
        ("ou", vec![record.department().to_string()]),
        ("telephoneNumber", vec![record.phone_number().to_string()]),
        ("description", vec![record.job_description().to_string()]),
    ]
}

/// A user entry as read back from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub dn: String,
    pub cn: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub mail: Option<String>,
    pub department: Option<String>,
    pub telephone_number: Option<String>,
    pub description: Option<String>,
}

impl UserView {
    pub fn from_attributes(dn: impl Into<String>, attributes: &AttributeMap) -> Self {
        let lookup = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone())
        };

        Self {
            dn: dn.into(),
            cn: lookup("cn"),
            surname: lookup("sn"),
            given_name: lookup("givenName"),
            mail: lookup("mail"),
            department: lookup("ou"),
            telephone_number: lookup("telephoneNumber"),
            description: lookup("description"),
        }
    }

    /// Present attributes as `(ldap name, value)` pairs in display order.
    pub fn attribute_lines(&self) -> Vec<(&'static str, &str)> {
        let values = [
            &self.cn,
            &self.surname,
            &self.given_name,
            &self.mail,
            &self.department,
            &self.telephone_number,
            &self.description,
        ];

        USER_DISPLAY_ATTRIBUTES
            .iter()
            .zip(values)
            .filter_map(|(name, value)| value.as_deref().map(|value| (*name, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CandidateRecord {
        CandidateRecord::new(
            "jdoe",
            "John Ronald Doe",
            "+1 555 0100",
            "jdoe@example.com",
            "Engineering",
            "Builds things",
        )
        .expect("valid record")
    }

    #[test]
    fn maps_record_fields_onto_inet_org_person() {
        let attributes = user_attributes(&record());
        let value = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, values)| values.clone())
                .expect("attribute present")
        };

        assert_eq!(value("cn"), vec!["jdoe"]);
        assert_eq!(value("givenName"), vec!["John"]);
        assert_eq!(value("sn"), vec!["Ronald Doe"]);
        assert_eq!(value("mail"), vec!["jdoe@example.com"]);
        assert_eq!(value("ou"), vec!["Engineering"]);
        assert_eq!(value("telephoneNumber"), vec!["+1 555 0100"]);
        assert_eq!(value("description"), vec!["Builds things"]);
        assert_eq!(
            value("objectClass"),
            vec!["inetOrgPerson", "organizationalPerson", "person", "top"]
        );
    }

    #[test]
    fn user_view_reads_attributes_case_insensitively() {
        let mut attributes = AttributeMap::new();
        attributes.insert("cn".to_string(), "jdoe".to_string());
        attributes.insert("givenname".to_string(), "John".to_string());
        attributes.insert("telephoneNumber".to_string(), "555".to_string());

        let view = UserView::from_attributes("cn=jdoe,ou=users,o=test", &attributes);
        assert_eq!(view.given_name.as_deref(), Some("John"));
        assert_eq!(view.surname, None);
        assert_eq!(
            view.attribute_lines(),
            vec![("cn", "jdoe"), ("givenName", "John"), ("telephoneNumber", "555")]
        );
    }
}
