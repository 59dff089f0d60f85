//! Log setup. Everything in the crate logs through `tracing`.

use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Debug-level trace line, tagged like `[Queue] ...`.
#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Installs the global subscriber. `RUST_LOG` overrides `log_filter`.
/// Returns false if a subscriber was already installed.
pub fn init(settings: &Settings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if settings.log_json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        crate::dlog!("[Log] Logging initialized (json={})", settings.log_json);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_noop() {
        let settings = Settings {
            log_filter: "not a [valid filter".to_string(),
            ..Settings::default()
        };
        init(&settings);
        assert!(!init(&Settings::default()));
    }
}
