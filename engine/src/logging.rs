use tracing::{Event, Subscriber};
use tracing_subscriber::{layer::Context, Layer, EnvFilter, Registry};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

const DEFAULT_FILTER: &str = "warn,spinnsip_engine=info";

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        } else {
            self.0.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        } else {
            self.0.push_str(&format!(" {}={}", field.name(), value));
        }
    }
}

struct SpinLayer;

impl<S: Subscriber> Layer<S> for SpinLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if visitor.0.is_empty() {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        match metadata.level().as_str() {
            "ERROR" => println!("[{}] ❌ Error: {} - {}", timestamp, metadata.target(), visitor.0),
            "WARN" => println!("[{}] ⚠️ Warning: {} - {}", timestamp, metadata.target(), visitor.0),
            "INFO" => println!("[{}] 🎡 {} - {}", timestamp, metadata.target(), visitor.0),
            "DEBUG" => {
                // Only store and session output at debug level
                if metadata.target().contains("services") || metadata.target().contains("games") {
                    println!("[{}] 🔄 {} - {}", timestamp, metadata.target(), visitor.0);
                }
            }
            _ => {}
        }
    }
}

/// Installs the global subscriber and forwards `log` records into it.
/// `RUST_LOG` overrides the default filter.
pub fn setup() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = Registry::default()
        .with(env_filter)
        .with(SpinLayer);

    subscriber.try_init()
}
