use super::*;

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["stayease-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["stayease-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["stayease-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn notify_availability_defaults() {
    let cli = Cli::try_parse_from(["stayease-cli", "notify-availability"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::NotifyAvailability {
            date: None,
            dry_run: false
        })
    ));
}

#[test]
fn notify_availability_accepts_date_and_dry_run() {
    let cli = Cli::try_parse_from([
        "stayease-cli",
        "notify-availability",
        "--date",
        "2026-03-10",
        "--dry-run",
    ])
    .expect("expected valid cli args");

    let Some(Commands::NotifyAvailability { date, dry_run }) = cli.command else {
        panic!("expected notify-availability");
    };
    assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 10));
    assert!(dry_run);
}

#[test]
fn notify_availability_rejects_bad_date() {
    assert!(Cli::try_parse_from(["stayease-cli", "notify-availability", "--date", "03/10/2026"])
        .is_err());
}

#[test]
fn sweep_instant_uses_midnight_of_given_date() {
    let instant = sweep_instant(NaiveDate::from_ymd_opt(2026, 3, 10));
    assert_eq!(instant.to_rfc3339(), "2026-03-10T00:00:00+00:00");
}

#[test]
fn parses_health_command() {
    let cli = Cli::try_parse_from(["stayease-cli", "health"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Health)));
}
