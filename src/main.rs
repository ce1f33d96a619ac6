//! Browser entry point: mounts the evaluation network app.

// Dependencies are used by the library target.
#![allow(unused_crate_dependencies)]

use evaluation_network::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App)
}
