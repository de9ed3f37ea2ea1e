use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str =
    "ifcduck=info,ifcduck_engine=info,ifcduck_executor=info,ifcduck_convert=info";
const VERBOSE_FILTER: &str =
    "ifcduck=debug,ifcduck_engine=debug,ifcduck_executor=debug,ifcduck_convert=debug";

/// Install the global subscriber. `RUST_LOG` wins over `verbose` when set.
/// Logs go to stderr so `convert` and `demo` output stays clean on stdout.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
