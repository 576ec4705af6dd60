use crate::commands::{self, DemoArgs, ImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ldap_provisioning::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "LDAP Provisioner",
    about = "Create LDAP user accounts in bulk from comma-delimited batch files",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create every user listed in a batch file that is not yet in the directory
    Import(ImportArgs),
    /// Inspect or remove provisioned users
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Import a batch twice against an in-memory directory to preview reports
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// List every user below the users container
    List,
    /// Show the attributes of one user
    Show {
        /// User id (the `cn` of the entry)
        id: String,
    },
    /// Delete one user
    Delete {
        /// User id (the `cn` of the entry)
        id: String,
    },
    /// Delete every user below the users container
    DeleteAll(DeleteAllArgs),
}

#[derive(Args, Debug)]
pub(crate) struct DeleteAllArgs {
    /// Confirm the removal of all users
    #[arg(long)]
    pub(crate) yes: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args),
        Command::Import(args) => commands::run_import(args),
        Command::Users { command } => match command {
            UsersCommand::List => commands::run_list_users(),
            UsersCommand::Show { id } => commands::run_show_user(&id),
            UsersCommand::Delete { id } => commands::run_delete_user(&id),
            UsersCommand::DeleteAll(args) => commands::run_delete_all_users(args),
        },
        Command::Demo(args) => commands::run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["ldap-provisioner"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_import_with_json_flag() {
        let cli = Cli::try_parse_from(["ldap-provisioner", "import", "users.csv", "--json"])
            .expect("parses");
        match cli.command {
            Some(Command::Import(args)) => {
                assert_eq!(args.file.to_str(), Some("users.csv"));
                assert!(args.json);
            }
            other => panic!("expected import command, got {other:?}"),
        }
    }

    #[test]
    fn parses_users_delete_all() {
        let cli = Cli::try_parse_from(["ldap-provisioner", "users", "delete-all", "--yes"])
            .expect("parses");
        assert!(matches!(
            cli.command,
            Some(Command::Users {
                command: UsersCommand::DeleteAll(DeleteAllArgs { yes: true })
            })
        ));
    }
}
