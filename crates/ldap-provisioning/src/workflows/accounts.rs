//! Administration of already-provisioned accounts: show, list and delete.

use crate::directory::{
    DirectoryClient, DirectoryError, DirectoryLayout, UserView, USER_DISPLAY_ATTRIBUTES,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("no user entry at '{dn}'")]
    NotFound { dn: String },
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
    pub dn: String,
    pub reason: String,
}

/// Result of removing every user below the users container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDeletion>,
}

impl DeletionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn describe_user<D>(
    directory: &mut D,
    layout: &DirectoryLayout,
    id: &str,
) -> Result<UserView, AdminError>
where
    D: DirectoryClient + ?Sized,
{
    let dn = layout.user_dn(id);
    match directory.fetch_attributes(&dn, &USER_DISPLAY_ATTRIBUTES)? {
        Some(attributes) => Ok(UserView::from_attributes(dn, &attributes)),
        None => Err(AdminError::NotFound { dn }),
    }
}

/// Every user below the users container, ordered by DN.
#[instrument(skip_all, fields(base = %layout.users_base()))]
pub fn list_users<D>(directory: &mut D, layout: &DirectoryLayout) -> Result<Vec<UserView>, AdminError>
where
    D: DirectoryClient + ?Sized,
{
    let mut dns = directory.list_children(&layout.users_base())?;
    dns.sort();

    let mut users = Vec::with_capacity(dns.len());
    for dn in dns {
        // Entries removed between listing and lookup are skipped.
        if let Some(attributes) = directory.fetch_attributes(&dn, &USER_DISPLAY_ATTRIBUTES)? {
            users.push(UserView::from_attributes(dn, &attributes));
        }
    }

    debug!(users = users.len(), "listed users");
    Ok(users)
}

/// Deletes one user after checking that it exists. Returns the removed DN.
pub fn delete_user<D>(
    directory: &mut D,
    layout: &DirectoryLayout,
    id: &str,
) -> Result<String, AdminError>
where
    D: DirectoryClient + ?Sized,
{
    let dn = layout.user_dn(id);
    if !directory.exists(&dn) {
        return Err(AdminError::NotFound { dn });
    }

    directory.delete(&dn)?;
    info!(%dn, "deleted user");
    Ok(dn)
}

/// Deletes every user one level below the users container. A failed delete
/// is recorded and the sweep moves on.
#[instrument(skip_all, fields(base = %layout.users_base()))]
pub fn delete_all_users<D>(
    directory: &mut D,
    layout: &DirectoryLayout,
) -> Result<DeletionReport, AdminError>
where
    D: DirectoryClient + ?Sized,
{
    let mut dns = directory.list_children(&layout.users_base())?;
    dns.sort();

    let mut report = DeletionReport::default();
    for dn in dns {
        match directory.delete(&dn) {
            Ok(()) => report.deleted.push(dn),
            Err(err) => {
                warn!(%dn, error = %err, "failed to delete user");
                report.failed.push(FailedDeletion {
                    dn,
                    reason: err.reason().to_string(),
                });
            }
        }
    }

    info!(
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "deleted all users"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;

    fn layout() -> DirectoryLayout {
        DirectoryLayout::new("o=test")
    }

    fn seeded() -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();
        directory.insert_entry(
            "cn=bob,ou=users,o=test",
            &[("cn", "bob"), ("sn", "Builder"), ("mail", "bob@example.com")],
        );
        directory.insert_entry("cn=alice,ou=users,o=test", &[("cn", "alice"), ("sn", "Liddell")]);
        directory.insert_entry("ou=groups,o=test", &[("ou", "groups")]);
        directory
    }

    #[test]
    fn describe_user_reads_display_attributes() {
        let mut directory = seeded();
        let user = describe_user(&mut directory, &layout(), "bob").expect("user found");
        assert_eq!(user.dn, "cn=bob,ou=users,o=test");
        assert_eq!(user.surname.as_deref(), Some("Builder"));
        assert_eq!(user.mail.as_deref(), Some("bob@example.com"));
        assert_eq!(user.telephone_number, None);
    }

    #[test]
    fn describe_missing_user_is_not_found() {
        let mut directory = seeded();
        let err = describe_user(&mut directory, &layout(), "carol").expect_err("user missing");
        assert!(matches!(err, AdminError::NotFound { dn } if dn == "cn=carol,ou=users,o=test"));
    }

    #[test]
    fn list_users_is_sorted_and_scoped_to_users_container() {
        let mut directory = seeded();
        let users = list_users(&mut directory, &layout()).expect("listing succeeds");
        let dns: Vec<_> = users.iter().map(|user| user.dn.as_str()).collect();
        assert_eq!(dns, ["cn=alice,ou=users,o=test", "cn=bob,ou=users,o=test"]);
    }

    #[test]
    fn delete_user_checks_existence_first() {
        let mut directory = seeded();
        let before = directory.operation_count();
        let err = delete_user(&mut directory, &layout(), "carol").expect_err("user missing");
        assert!(matches!(err, AdminError::NotFound { .. }));
        assert_eq!(directory.operation_count(), before + 1);

        let dn = delete_user(&mut directory, &layout(), "bob").expect("delete succeeds");
        assert_eq!(dn, "cn=bob,ou=users,o=test");
        assert!(!directory.contains(&dn));
    }

    #[test]
    fn delete_all_continues_past_failures() {
        let mut directory = seeded();
        directory.fail_delete("cn=alice,ou=users,o=test", DirectoryError::rejected(50));

        let report = delete_all_users(&mut directory, &layout()).expect("sweep runs");
        assert_eq!(report.deleted, vec!["cn=bob,ou=users,o=test".to_string()]);
        assert_eq!(
            report.failed,
            vec![FailedDeletion {
                dn: "cn=alice,ou=users,o=test".into(),
                reason: "Insufficient Access Rights".into(),
            }]
        );
        assert!(!report.is_clean());
        assert!(directory.contains("ou=groups,o=test"));
    }
}
