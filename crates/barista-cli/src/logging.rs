//! Structured logging setup.

use barista_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Build the env filter: `RUST_LOG` wins, then `--verbose`, then the config.
fn build_filter(config: Option<&LoggingConfig>, verbose: bool) -> EnvFilter {
    let level = if verbose {
        "debug".to_string()
    } else {
        config
            .and_then(|c| c.level.clone())
            .unwrap_or_else(|| "info".to_string())
    };

    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    for directive in config.map(|c| c.filters.as_slice()).unwrap_or_default() {
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("Ignoring invalid log filter '{directive}': {e}"),
        }
    }
    filter
}

/// Install the global tracing subscriber.
pub fn init(config: Option<&LoggingConfig>, verbose: bool) {
    let filter = build_filter(config, verbose);
    let json = config.is_some_and(|c| c.format == "json");
    let stdout = config.is_some_and(|c| c.output == "stdout");

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match (json, stdout) {
        (true, true) => builder.json().with_writer(std::io::stdout).init(),
        (true, false) => builder.json().with_writer(std::io::stderr).init(),
        (false, true) => builder.with_writer(std::io::stdout).init(),
        (false, false) => builder.with_writer(std::io::stderr).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_includes_config_directives() {
        let config = LoggingConfig {
            format: "plain".into(),
            level: Some("warn".into()),
            filters: vec!["barista_core=trace".into()],
            output: "stderr".into(),
        };
        let filter = build_filter(Some(&config), false).to_string();
        assert!(filter.contains("barista_core=trace"), "{filter}");
    }
}
