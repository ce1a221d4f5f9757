use clap::Parser;
use kira_dxeval::cli::{Cli, Commands};
use kira_dxeval::config::EngineConfig;
use kira_dxeval::taxonomy::load_builtin;
use tempfile::tempdir;

#[test]
fn defaults_match_q8_8_and_fifteen_classes() {
    let config = EngineConfig::default();
    assert_eq!(config.data_width, 16);
    assert_eq!(config.frac_bits, 8);
    assert_eq!(config.num_classes, 15);
    assert_eq!(config.expected_outputs, 15);
    assert_eq!(config.secondary_threshold, 0.3);
    assert!(!config.zero_fill_malformed);
    config.validate(&load_builtin().unwrap()).unwrap();
}

#[test]
fn partial_json_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(&path, r#"{"secondary_threshold": 0.5}"#).unwrap();
    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.secondary_threshold, 0.5);
    assert_eq!(config.data_width, 16);
    assert_eq!(config.num_classes, 15);
}

#[test]
fn invalid_configs_are_rejected() {
    let tax = load_builtin().unwrap();
    let bad = [
        EngineConfig {
            frac_bits: 16,
            ..EngineConfig::default()
        },
        EngineConfig {
            secondary_threshold: 1.5,
            ..EngineConfig::default()
        },
        EngineConfig {
            num_classes: 10,
            expected_outputs: 10,
            ..EngineConfig::default()
        },
        EngineConfig {
            expected_outputs: 14,
            ..EngineConfig::default()
        },
    ];
    for config in bad {
        assert!(config.validate(&tax).is_err(), "{:?}", config);
    }
}

#[test]
fn cli_flags_override_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(&path, r#"{"secondary_threshold": 0.5, "frac_bits": 4}"#).unwrap();
    let path_arg = path.to_string_lossy().to_string();
    let cli = Cli::parse_from([
        "kira-dxeval",
        "validate",
        "--input",
        "scores.txt",
        "--config",
        path_arg.as_str(),
        "--secondary-threshold",
        "0.2",
        "--zero-fill-malformed",
    ]);
    match cli.command {
        Commands::Validate(args) => {
            let config = args.engine.resolve_config().unwrap();
            assert_eq!(config.secondary_threshold, 0.2);
            assert_eq!(config.frac_bits, 4);
            assert!(config.zero_fill_malformed);
        }
        _ => panic!("expected validate command"),
    }
}

#[test]
fn run_requires_input_or_synthetic() {
    assert!(Cli::try_parse_from(["kira-dxeval", "run"]).is_err());
    assert!(
        Cli::try_parse_from(["kira-dxeval", "run", "--input", "x", "--synthetic"]).is_err()
    );
    let cli = Cli::try_parse_from(["kira-dxeval", "run", "--synthetic"]).unwrap();
    match cli.command {
        Commands::Run(args) => {
            assert!(args.synthetic);
            assert_eq!(args.seed, 42);
            assert_eq!(args.synthetic_rounds, 1);
        }
        _ => panic!("expected run command"),
    }
}
