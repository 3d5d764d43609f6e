//! Colorful console output for relocation events.
//!
//! Provides a custom `tracing` layer that formats relocation events with
//! colors. Enabled by the `console` feature.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

const DEFAULT_DIRECTIVES: &[&str] = &["relocator_solver=info", "relocator_store=info"];

/// Initializes the relocation console output.
///
/// Safe to call multiple times - only the first call has effect. Does
/// nothing if another global subscriber is already installed.
pub fn init() {
    INIT.get_or_init(|| {
        let mut filter = EnvFilter::from_default_env();
        for directive in DEFAULT_DIRECTIVES {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(RelocationConsoleLayer)
            .try_init();
        if installed.is_ok() {
            print_banner();
        }
    });
}

fn print_banner() {
    let line = format!(
        "relocator v{} - sub-unit relocation engine",
        env!("CARGO_PKG_VERSION")
    );
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats relocation events with colors.
pub struct RelocationConsoleLayer;

impl<S: Subscriber> Layer<S> for RelocationConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();
        if !target.starts_with("relocator_solver") && !target.starts_with("relocator_store") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    booking: Option<u64>,
    listing: Option<u64>,
    room_booking: Option<u64>,
    units: Option<u64>,
    records: Option<u64>,
    objects: Option<u64>,
    budget_secs: Option<u64>,
    duration_ms: Option<u64>,
    solutions: Option<u64>,
    from: Option<u64>,
    to: Option<u64>,
    combinations: Option<String>,
    iteration: Option<String>,
    iterations: Option<String>,
    signature: Option<String>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "combinations" => self.combinations = Some(value),
            "iteration" => self.iteration = Some(value),
            "iterations" => self.iterations = Some(value),
            "signature" => self.signature = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "booking" => self.booking = Some(value),
            "listing" => self.listing = Some(value),
            "room_booking" => self.room_booking = Some(value),
            "units" => self.units = Some(value),
            "records" => self.records = Some(value),
            "objects" => self.objects = Some(value),
            "budget_secs" => self.budget_secs = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "solutions" => self.solutions = Some(value),
            "from" => self.from = Some(value),
            "to" => self.to = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        self.set_text(field.name(), value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "relocation_matrix" => format_matrix(v),
        "relocation_start" => format_start(v),
        "relocation_end" => format_end(v),
        "relocation_exhausted" => format_exhausted(v),
        "relocation_timeout" => format_timeout(v),
        "unit_assigned" => format_unit_assigned(v),
        _ => String::new(),
    }
}

fn info_prefix() -> String {
    format!(
        "{} {} {}",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Relocator]".bright_cyan()
    )
}

fn warn_prefix() -> String {
    format!(
        "{} {} {}",
        timestamp().bright_black(),
        "WARN".bright_yellow(),
        "[Relocator]".bright_cyan()
    )
}

fn format_matrix(v: &EventVisitor) -> String {
    format!(
        "{} booking #{} on listing #{}: {} records over {} sub-units",
        info_prefix(),
        v.booking.unwrap_or(0).to_string().white().bold(),
        v.listing.unwrap_or(0),
        v.records.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
        v.units.unwrap_or(0).to_string().bright_yellow()
    )
}

fn format_start(v: &EventVisitor) -> String {
    format!(
        "{} Search started for room booking #{}: objects ({}), combinations ({}), budget ({})",
        info_prefix(),
        v.room_booking.unwrap_or(0).to_string().white().bold(),
        v.objects.unwrap_or(0).to_string().bright_yellow(),
        format_count(v.combinations.as_deref()).bright_magenta(),
        format_duration_ms(v.budget_secs.unwrap_or(0) * 1000).yellow()
    )
}

fn format_end(v: &EventVisitor) -> String {
    format!(
        "{} Moveset {} found at iteration ({}) in {}, solutions ({})",
        info_prefix(),
        v.signature.as_deref().unwrap_or("").bright_green().bold(),
        format_count(v.iteration.as_deref()).bright_magenta(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        v.solutions.unwrap_or(0).to_formatted_string(&Locale::en).white()
    )
}

fn format_exhausted(v: &EventVisitor) -> String {
    format!(
        "{} {} after {} combinations in {}",
        warn_prefix(),
        "No fitting moveset".bright_red().bold(),
        format_count(v.iterations.as_deref()).bright_magenta(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow()
    )
}

fn format_timeout(v: &EventVisitor) -> String {
    format!(
        "{} {} for room booking #{} after {}",
        warn_prefix(),
        "Search timed out".bright_red().bold(),
        v.room_booking.unwrap_or(0),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow()
    )
}

fn format_unit_assigned(v: &EventVisitor) -> String {
    format!(
        "    {} room booking #{} {} -> {}",
        "->".bright_blue(),
        v.room_booking.unwrap_or(0).to_string().white(),
        v.from.unwrap_or(0).to_string().yellow(),
        v.to.unwrap_or(0).to_string().bright_green()
    )
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

/// Thousands-separated count, or scientific notation past 15 digits.
fn format_count(value: Option<&str>) -> String {
    let Some(n) = value.and_then(|s| s.parse::<u128>().ok()) else {
        return "?".to_string();
    };
    if n < 1_000_000_000_000_000 {
        return n.to_formatted_string(&Locale::en);
    }

    let log_scale = (n as f64).log10();
    let exponent = log_scale.floor() as i32;
    let mantissa = 10f64.powf(log_scale - exponent as f64);
    format!("{:.3} x 10^{}", mantissa, exponent)
}
