//! Logging setup.
//!
//! The server calls [`init`] once, with the level from the resolved config.

use tracing_subscriber::EnvFilter;

use crate::error::BabblerError;

/// Installs a stderr `tracing-subscriber` filtered by `level`.
///
/// `level` is a level name (`info`) or an `EnvFilter` directive list
/// (`babbler_core=debug,actix_web=warn`). `RUST_LOG` is only consulted when
/// `level` does not parse.
pub fn init(level: &str) -> Result<(), BabblerError> {
	let filter = EnvFilter::try_new(level).or_else(|level_err| {
		EnvFilter::try_from_default_env().map_err(|env_err| {
			BabblerError::Logger(format!("bad log level '{level}' ({level_err}) and no usable RUST_LOG ({env_err})"))
		})
	})?;

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init()
		.map_err(|e| BabblerError::Logger(format!("subscriber already installed: {e}")))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_init_reports_installed_subscriber() {
		let _ = init("babbler_core=debug,warn");
		match init("info") {
			Err(BabblerError::Logger(msg)) => assert!(msg.contains("already installed"), "{msg}"),
			other => panic!("expected a logger error, got {other:?}"),
		}
	}
}
