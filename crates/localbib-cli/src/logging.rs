use tracing_subscriber::EnvFilter;

/// Crates whose events are shown at the chosen verbosity. Everything else
/// stays at `warn` unless `RUST_LOG` says otherwise.
const OWN_TARGETS: [&str; 4] = ["localbib", "localbib_core", "localbib_bibtex", "localbib_render"];

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Default filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> String {
    let level = level_for(verbosity);
    let mut directive = String::from("warn");
    for target in OWN_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

/// Install a stderr subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_scopes_verbosity_to_own_crates() {
        assert_eq!(
            default_directive(0),
            "warn,localbib=info,localbib_core=info,localbib_bibtex=info,localbib_render=info"
        );
        assert!(default_directive(1).contains("localbib_core=debug"));
        assert!(default_directive(5).contains("localbib_bibtex=trace"));
    }

    #[test]
    fn default_directive_parses() {
        assert!(EnvFilter::try_new(default_directive(2)).is_ok());
    }
}
