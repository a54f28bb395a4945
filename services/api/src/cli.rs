use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rentivo::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rentivo-api",
    about = "Run the Rentivo property management API or walk through a demo tenancy",
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
    /// Walk a landlord and tenant through invitation, invoicing, and lease expiry
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Persist documents to this JSON snapshot instead of memory only
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["rentivo-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "rentivo-api",
            "serve",
            "--port",
            "8081",
            "--data-file",
            "/tmp/rentivo.json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8081));
                assert_eq!(args.data_file, Some(PathBuf::from("/tmp/rentivo.json")));
                assert!(args.host.is_none());
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn demo_parses_dates_and_policy() {
        let cli = Cli::try_parse_from(["rentivo-api", "demo", "--as-of", "2025-01-02", "--strict"])
            .expect("parses");
        match cli.command {
            Some(Command::Demo(args)) => {
                assert!(args.strict);
                assert_eq!(
                    args.as_of,
                    chrono::NaiveDate::from_ymd_opt(2025, 1, 2)
                );
            }
            other => panic!("expected demo, got {other:?}"),
        }

        assert!(Cli::try_parse_from(["rentivo-api", "demo", "--as-of", "soon"]).is_err());
    }
}
