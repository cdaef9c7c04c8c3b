use lazy_static::lazy_static;
use std::env;

lazy_static! {
	static ref APP_ID: Option<String> = env::var("DARLEAN_APP_ID").ok();
}

/// The application id this process was launched with, if set via
/// `DARLEAN_APP_ID` or `--app-id`. Nodes read this before consulting
/// `rt-config`, so process identity is available ahead of full config
/// parsing.
pub fn app_id() -> Option<&'static str> {
	APP_ID.as_deref()
}
