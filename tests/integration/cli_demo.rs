//! The fibonacci demo driven through the CLI routing layer

use weaver::cli::{fibonacci, Commands, FibOptions, RunContext};
use weaver::config::WeaverConfig;
use weaver::Weaver;

#[test]
fn test_cached_and_uncached_agree() {
    let plain = fibonacci(
        &Weaver::new(),
        FibOptions {
            n: 15,
            cache: false,
            trace_calls: false,
            repeat: 1,
        },
    )
    .unwrap();
    let cached = fibonacci(
        &Weaver::new(),
        FibOptions {
            n: 15,
            cache: true,
            trace_calls: true,
            repeat: 3,
        },
    )
    .unwrap();

    assert_eq!(plain.value, 610);
    assert_eq!(cached.value, plain.value);
    assert_eq!(cached.executions, 16);
    assert!(plain.executions > cached.executions);
}

#[test]
fn test_overflow_is_reported_as_raised_error() {
    let context = RunContext::new(&WeaverConfig::default());
    let err = context
        .execute(&Commands::Fib {
            n: 100,
            cache: true,
            trace_calls: false,
            repeat: 1,
        })
        .unwrap_err();
    assert!(err.to_string().contains("overflows u64"));
}

#[test]
fn test_parser_rejects_index_beyond_u64_range() {
    use clap::Parser;
    use weaver::cli::Cli;

    let accepted = Cli::try_parse_from(["weaver", "fib", "93", "--cache"]).unwrap();
    assert!(matches!(accepted.command, Commands::Fib { n: 93, .. }));

    assert!(Cli::try_parse_from(["weaver", "fib", "94"]).is_err());
    assert!(Cli::try_parse_from(["weaver", "fib", "200000", "--cache"]).is_err());
}

#[test]
fn test_parser_rejects_zero_repeat() {
    use clap::Parser;
    use weaver::cli::Cli;

    assert!(Cli::try_parse_from(["weaver", "fib", "0", "--repeat", "0"]).is_err());
    let parsed = Cli::try_parse_from(["weaver", "fib", "0"]).unwrap();
    assert!(matches!(parsed.command, Commands::Fib { repeat: 1, .. }));
}
