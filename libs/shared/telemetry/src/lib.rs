// [libs/shared/telemetry/src/lib.rs]
/*!
 * MODULE: TELEMETRY BOOTSTRAP
 * LAYER: SHARED UTILITY (L4)
 * RESPONSIBILITY: STRUCTURED LOGGING AND PANIC CAPTURE
 *
 * Development: compact colorized output. Production: flat JSON lines
 * suitable for log ingestion. Either way a panic in any thread is
 * surfaced through `tracing` before the process exits.
 */

use std::panic;
use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};

/// Initializes the global tracing subscriber. Panics if a subscriber is
/// already installed in this process — call once, at process start.
#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{service_name}={default_level},tower_http=warn,hyper=warn,libsql=warn").into()
    });

    let is_production = !cfg!(debug_assertions);

    if is_production {
        tracing_subscriber::registry()
            .with(filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    }

    install_panic_hook(service_name);
    info!(service = service_name, "telemetry initialized");
}

fn install_panic_hook(service_name: &str) {
    let service_name = service_name.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("no panic message");

        error!(
            target: "panic",
            service = %service_name,
            location = %location,
            "thread panicked: {}",
            message
        );
    }));
}
