#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_no_subcommand_defaults_to_dev() {
        let cli = Cli::try_parse_from(["tandem"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.command.unwrap_or_default(), Command::Dev(_)));
    }

    #[test]
    fn test_dev_args() {
        let cli =
            Cli::try_parse_from(["tandem", "dev", "--cwd", "app", "--port", "4000"]).unwrap();
        match cli.command {
            Some(Command::Dev(args)) => {
                assert_eq!(args.cwd, Some(PathBuf::from("app")));
                assert_eq!(args.port, Some(4000));
                assert!(args.config.is_none());
            }
            other => panic!("Expected dev command, got {other:?}"),
        }
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Cli::try_parse_from(["tandem", "dev", "--port", "0"]).is_err());
    }

    #[test]
    fn test_check_schema_flag() {
        let cli = Cli::try_parse_from(["tandem", "check", "--schema"]).unwrap();
        match cli.command {
            Some(Command::Check(args)) => assert!(args.schema),
            other => panic!("Expected check command, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tandem", "dev", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["tandem", "-v", "-q"]).is_err());
    }
}
