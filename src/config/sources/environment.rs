//! Environment source: CATALOG_STRATA__SECTION__KEY=value

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "CATALOG_STRATA";

/// Add environment overrides. Nested keys are separated by `__`; list values
/// (`load_strata`) are comma separated.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("strata.load_strata")
            .try_parsing(true),
    )
}
