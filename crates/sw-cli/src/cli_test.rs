use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_migrate_with_overrides() {
    let cli = Cli::try_parse_from([
        "stepwise",
        "--project",
        "shop",
        "--engine",
        "duckdb",
        "--ddl",
        "shop.duckdb",
        "migrate",
        "--short",
    ])
    .unwrap();

    assert_eq!(cli.global.project.as_deref(), Some("shop"));
    assert_eq!(cli.global.engine, Some(DbKind::DuckDb));
    assert_eq!(cli.global.ddl.as_deref(), Some("shop.duckdb"));
    match cli.command {
        Commands::Migrate(args) => {
            assert!(args.short);
            assert_eq!(args.output, OutputFormat::Text);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["stepwise", "status", "-o", "json", "--timeout", "5", "-v"])
        .unwrap();

    assert!(cli.global.verbose);
    assert_eq!(cli.global.timeout, Some(5));
    assert!(matches!(
        cli.command,
        Commands::Status(StatusArgs {
            output: OutputFormat::Json
        })
    ));
}

#[test]
fn test_unknown_engine_is_rejected() {
    assert!(Cli::try_parse_from(["stepwise", "--engine", "oracle", "exists"]).is_err());
}
