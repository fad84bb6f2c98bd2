use clap::Parser;
use dig_survive::config::*;

#[test]
fn defaults_follow_the_terminal() {
    let config = Config::try_parse_from(["dig_survive"]).unwrap();
    assert_eq!(config.seed, None);
    assert_eq!(config.start_level, 1);
    assert!(config.log_file.is_none());
    assert!(config.validate().is_ok());
    assert_eq!(config.world_size(80, 24), Ok((40, 22)));
}

#[test]
fn flags_override_the_terminal() {
    let config = Config::try_parse_from([
        "dig_survive",
        "--seed",
        "7",
        "--start-level",
        "3",
        "--width",
        "30",
        "--height",
        "12",
        "--log-file",
        "/tmp/dig.log",
    ])
    .unwrap();
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.start_level, 3);
    assert_eq!(config.world_size(200, 60), Ok((30, 12)));
    assert_eq!(config.log_file.as_deref(), Some(std::path::Path::new("/tmp/dig.log")));
}

#[test]
fn level_zero_is_rejected() {
    let config = Config::try_parse_from(["dig_survive", "--start-level", "0"]).unwrap();
    assert_eq!(config.validate(), Err(ConfigError::InvalidLevel(0)));
}

#[test]
fn tiny_worlds_are_rejected() {
    let config = Config::try_parse_from(["dig_survive", "--width", "6", "--height", "20"]).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ViewportTooSmall { width: 6, height: 20, .. })
    ));

    let config = Config::try_parse_from(["dig_survive"]).unwrap();
    assert!(matches!(
        config.world_size(14, 40),
        Err(ConfigError::ViewportTooSmall { width: 7, .. })
    ));
}

#[test]
fn unknown_flags_fail_to_parse() {
    assert!(Config::try_parse_from(["dig_survive", "--difficulty", "hard"]).is_err());
}
