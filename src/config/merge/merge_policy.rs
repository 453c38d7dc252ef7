//! Merge rules: defaults and override order.

use crate::catalog::Diagnostics;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with built-in defaults applied. Later sources added to the
/// builder override earlier ones key by key; tables merge, arrays replace.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default(
            "diagnostics.max_recorded",
            Diagnostics::DEFAULT_MAX_RECORDED as i64,
        )?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
