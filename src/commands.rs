use crate::cli::DeleteAllArgs;
use clap::Args;
use ldap_provisioning::config::{AppConfig, LdapConfig};
use ldap_provisioning::directory::{DirectorySession, InMemoryDirectory, UserView};
use ldap_provisioning::error::AppError;
use ldap_provisioning::telemetry;
use ldap_provisioning::workflows::accounts::{
    delete_all_users, delete_user, describe_user, list_users,
};
use ldap_provisioning::{BatchImporter, DirectoryLayout, ImportReport, RecordParser};
use std::path::{Path, PathBuf};
use tracing::warn;

const DEMO_BASE_PATH: &str = "o=demo";

const SAMPLE_BATCH: &str = "\
id,full_name,phone_number,email,department,job_description
jdoe,John Doe,+1 555 0100,jdoe@example.com,Engineering,Backend developer
asmith,Alice Smith,+1 555 0101,asmith@example.com,Sales,Account manager
mgarcia,Maria Garcia Lopez,+1 555 0102,mgarcia@example.com,Finance,Controller
kwong,Kai Wong,+1 555 0103,kwong@example.com,Engineering,Site reliability
";

/// Id pre-seeded into the demo directory when the built-in sample is used.
const SAMPLE_EXISTING_ID: &str = "asmith";

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Batch file (.csv) starting with the expected header line
    pub(crate) file: PathBuf,
    /// Print the import report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Batch file (.csv) to import. Defaults to a built-in sample.
    pub(crate) file: Option<PathBuf>,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs { file, json } = args;

    ensure_csv_path(&file)?;
    let config = load_config()?;
    let records = RecordParser::from_path(&file)?;

    let importer = BatchImporter::new(config.ldap.layout());
    let report = with_session(&config.ldap, |session| Ok(importer.run(&records, session)))?;

    if json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &report)
            .map_err(std::io::Error::from)?;
        println!();
    } else {
        render_import(&file, &report);
    }
    Ok(())
}

pub(crate) fn run_list_users() -> Result<(), AppError> {
    let config = load_config()?;
    let layout = config.ldap.layout();
    let users = with_session(&config.ldap, |session| Ok(list_users(session, &layout)?))?;

    if users.is_empty() {
        println!("No users found under {}", layout.users_base());
        return Ok(());
    }

    println!("{} user(s) under {}", users.len(), layout.users_base());
    for user in &users {
        println!();
        render_user(user);
    }
    Ok(())
}

pub(crate) fn run_show_user(id: &str) -> Result<(), AppError> {
    let config = load_config()?;
    let layout = config.ldap.layout();
    let user = with_session(&config.ldap, |session| Ok(describe_user(session, &layout, id)?))?;
    render_user(&user);
    Ok(())
}

pub(crate) fn run_delete_user(id: &str) -> Result<(), AppError> {
    let config = load_config()?;
    let layout = config.ldap.layout();
    let dn = with_session(&config.ldap, |session| Ok(delete_user(session, &layout, id)?))?;
    println!("Deleted {dn}");
    Ok(())
}

pub(crate) fn run_delete_all_users(args: DeleteAllArgs) -> Result<(), AppError> {
    if !args.yes {
        return Err(AppError::InvalidInput(
            "refusing to delete every user without --yes".to_string(),
        ));
    }

    let config = load_config()?;
    let layout = config.ldap.layout();
    let report = with_session(&config.ldap, |session| Ok(delete_all_users(session, &layout)?))?;

    println!(
        "Deleted {} user(s) under {}",
        report.deleted.len(),
        layout.users_base()
    );
    if !report.is_clean() {
        println!("Could not delete:");
        for failure in &report.failed {
            println!("- {}: {}", failure.dn, failure.reason);
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let layout = DirectoryLayout::new(DEMO_BASE_PATH);
    let mut directory = InMemoryDirectory::new();

    let records = match &args.file {
        Some(path) => {
            ensure_csv_path(path)?;
            RecordParser::from_path(path)?
        }
        None => {
            directory.insert_entry(
                layout.user_dn(SAMPLE_EXISTING_ID),
                &[("cn", SAMPLE_EXISTING_ID), ("sn", "Smith")],
            );
            RecordParser::from_reader(SAMPLE_BATCH.as_bytes())?
        }
    };

    println!(
        "LDAP provisioning demo: {} record(s) against an in-memory directory ({})",
        records.len(),
        layout.users_base()
    );

    let importer = BatchImporter::new(layout.clone());
    for pass in 1..=2 {
        let report = importer.run(&records, &mut directory);
        println!(
            "\nPass {pass}: {} created, {} failed",
            report.created_count(),
            report.failed_count()
        );
        println!("{}", report.summary);
    }

    let users = list_users(&mut directory, &layout)?;
    println!("\nDirectory now holds {} user(s)", users.len());
    for user in &users {
        println!();
        render_user(user);
    }
    Ok(())
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

/// Runs `work` on a freshly bound session and unbinds afterwards, whatever
/// `work` returned.
fn with_session<T, F>(config: &LdapConfig, work: F) -> Result<T, AppError>
where
    F: FnOnce(&mut DirectorySession) -> Result<T, AppError>,
{
    let mut session = DirectorySession::connect(config)?;
    let result = work(&mut session);
    if let Err(err) = session.close() {
        warn!(error = %err, "failed to unbind directory session");
    }
    result
}

fn ensure_csv_path(path: &Path) -> Result<(), AppError> {
    let is_csv = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a .csv file",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(AppError::InvalidInput(format!(
            "'{}' does not exist",
            path.display()
        )));
    }
    Ok(())
}

fn render_import(file: &Path, report: &ImportReport) {
    println!(
        "Processed {} record(s) from {}: {} created, {} failed",
        report.record_count(),
        file.display(),
        report.created_count(),
        report.failed_count()
    );
    println!("{}", report.summary);
}

fn render_user(user: &UserView) {
    println!("{}", user.dn);
    for (name, value) in user.attribute_lines() {
        println!("  {name}: {value}");
    }
}
