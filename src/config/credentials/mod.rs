use super::schema::Config;
use tracing::debug;

macro_rules! define_credentials {
    ($( $name:literal, $env:literal => $($path:ident).+ );* $(;)?) => {
        /// All known credential slot names.
        pub const CREDENTIAL_NAMES: &[&str] = &[$($name),*];

        /// (slot name, env var name) pairs.
        pub const CREDENTIAL_ENV_VARS: &[(&str, &str)] = &[$(($name, $env)),*];

        /// Get the current value of a credential field by slot name.
        pub fn get_credential_value<'a>(config: &'a Config, name: &str) -> Option<&'a str> {
            match name {
                $($name => Some(config.$($path).+.as_str()),)*
                _ => None,
            }
        }

        /// Apply environment variable overrides.
        ///
        /// Any `GRIDHUB_*` env var that is set and non-empty overwrites the
        /// corresponding config field, so secrets can be injected without
        /// touching the config file.
        pub fn apply_env_overrides(config: &mut Config) {
            $(
                if let Ok(val) = std::env::var($env) {
                    if !val.is_empty() {
                        config.$($path).+ = val;
                    }
                }
            )*
            apply_legacy_overrides(config);
        }
    };
}

define_credentials! {
    "gemini-api-key",    "GRIDHUB_GEMINI_API_KEY"    => providers.gemini.api_key;
    "system-secret",     "GRIDHUB_SYSTEM_SECRET"     => provisioning.system_secret;
}

/// Unprefixed variable names honoured only when the slot is still empty.
const LEGACY_ENV_VARS: &[(&str, &str)] = &[
    ("gemini-api-key", "GEMINI_API_KEY"),
    ("system-secret", "SYSTEM_SECRET"),
];

fn apply_legacy_overrides(config: &mut Config) {
    for &(name, env) in LEGACY_ENV_VARS {
        if get_credential_value(config, name).is_some_and(|v| !v.is_empty()) {
            continue;
        }
        let Ok(val) = std::env::var(env) else {
            continue;
        };
        if val.is_empty() {
            continue;
        }
        debug!("loaded {name} from {env}");
        match name {
            "gemini-api-key" => config.providers.gemini.api_key = val,
            "system-secret" => config.provisioning.system_secret = val,
            _ => {}
        }
    }
}

/// Where each credential currently comes from, for `gridhub onboard` output.
pub fn credential_sources(config: &Config) -> Vec<(&'static str, &'static str)> {
    CREDENTIAL_ENV_VARS
        .iter()
        .map(|&(name, env)| {
            let source = if std::env::var(env).is_ok_and(|v| !v.is_empty()) {
                "env"
            } else if get_credential_value(config, name).is_some_and(|v| !v.is_empty()) {
                "config"
            } else {
                "unset"
            };
            (name, source)
        })
        .collect()
}
