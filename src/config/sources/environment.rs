//! Environment source: `WEAVER__DISPATCH__TRACE=true`, `WEAVER__LOGGING__LEVEL=debug`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const PREFIX: &str = "WEAVER";
pub const SEPARATOR: &str = "__";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator(SEPARATOR)
            .separator(SEPARATOR)
            .try_parsing(true),
    )
}
