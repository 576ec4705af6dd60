use ldap_provisioning::directory::{DirectoryConnector, InMemoryDirectory};
use ldap_provisioning::workflows::accounts::{
    delete_all_users, delete_user, describe_user, list_users, AdminError,
};
use ldap_provisioning::{BatchImporter, DirectoryError, DirectoryLayout, RecordParser};

const USERS_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/users.csv");

fn provisioned() -> (InMemoryDirectory, DirectoryLayout) {
    let layout = DirectoryLayout::new("dc=example,dc=org");
    let mut directory = InMemoryDirectory::new();
    let records = RecordParser::from_path(USERS_FIXTURE).expect("fixture parses");
    let report = BatchImporter::new(layout.clone()).run(&records, &mut directory);
    assert_eq!(report.created_count(), records.len());
    (directory, layout)
}

#[test]
fn provisioned_users_can_be_described_and_listed() {
    let (mut directory, layout) = provisioned();

    let user = describe_user(&mut directory, &layout, "asmith").expect("user present");
    let lines = user.attribute_lines();
    assert_eq!(
        lines,
        vec![
            ("cn", "asmith"),
            ("sn", "Smith"),
            ("givenName", "Alice"),
            ("mail", "asmith@example.com"),
            ("ou", "Sales"),
            ("telephoneNumber", "+1 555 0101"),
            ("description", "Account manager"),
        ]
    );

    let dns: Vec<String> = list_users(&mut directory, &layout)
        .expect("listing succeeds")
        .into_iter()
        .map(|user| user.dn)
        .collect();
    assert_eq!(
        dns,
        vec![
            "cn=asmith,ou=users,dc=example,dc=org",
            "cn=jdoe,ou=users,dc=example,dc=org",
            "cn=mgarcia,ou=users,dc=example,dc=org",
        ]
    );
}

#[test]
fn sessions_opened_through_the_connector_share_the_directory() {
    let (directory, layout) = provisioned();
    let mut session = directory.open().expect("session opens");

    let removed = delete_user(session.as_mut(), &layout, "jdoe").expect("delete succeeds");
    assert_eq!(removed, "cn=jdoe,ou=users,dc=example,dc=org");
    assert_eq!(directory.len(), 2);
}

#[test]
fn deleting_an_unknown_user_issues_no_delete() {
    let (mut directory, layout) = provisioned();
    directory.fail_delete(
        "cn=ghost,ou=users,dc=example,dc=org",
        DirectoryError::rejected(50),
    );

    let err = delete_user(&mut directory, &layout, "ghost").expect_err("user missing");
    match err {
        AdminError::NotFound { dn } => assert_eq!(dn, "cn=ghost,ou=users,dc=example,dc=org"),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(directory.len(), 3);
}

#[test]
fn delete_all_empties_the_container_and_reimport_recreates_it() {
    let (mut directory, layout) = provisioned();

    let report = delete_all_users(&mut directory, &layout).expect("sweep runs");
    assert_eq!(report.deleted.len(), 3);
    assert!(report.is_clean());
    assert!(list_users(&mut directory, &layout)
        .expect("listing succeeds")
        .is_empty());

    let records = RecordParser::from_path(USERS_FIXTURE).expect("fixture parses");
    let again = BatchImporter::new(layout.clone()).run(&records, &mut directory);
    assert_eq!(again.created_count(), 3);
}
