mod cli;
mod commands;
mod infra;
mod routes;
mod server;

// Directory sessions drive their own runtime, so only `serve` starts tokio.
fn main() {
    if let Err(err) = cli::run() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
