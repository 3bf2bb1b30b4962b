//! Log line formatter that stamps every event with the current simulation step.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Simulation steps taken by any [`Game`](crate::game::Game) in this process.
static STEP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Steps are shown as 4 hex digits and wrap.
const STEP_DISPLAY_MASK: u64 = 0xFFFF;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:4]");

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Formats events as `time step level spans target: fields`.
///
/// Mirrors the layout of `tracing_subscriber`'s full formatter, with the step counter
/// inserted after the timestamp so log lines can be correlated with simulation state.
pub struct StepFormatter;

impl<S, N> FormatEvent<S, N> for StepFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        styled(&mut writer, DIM, timestamp)?;
        writer.write_char(' ')?;

        styled(&mut writer, DIM, format_args!("0x{:04X}", get_step_count() & STEP_DISPLAY_MASK))?;
        writer.write_char(' ')?;

        write_level(&mut writer, meta.level())?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            let mut any = false;
            for span in scope.from_root() {
                styled(&mut writer, BOLD, span.metadata().name())?;
                any = true;

                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        styled(&mut writer, BOLD, "{")?;
                        write!(writer, "{fields}")?;
                        styled(&mut writer, BOLD, "}")?;
                    }
                }
                styled(&mut writer, DIM, ':')?;
            }
            if any {
                writer.write_char(' ')?;
            }
        }

        styled(&mut writer, DIM, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn write_level(writer: &mut Writer<'_>, level: &Level) -> fmt::Result {
    let (color, text) = match *level {
        Level::TRACE => ("\x1b[35m", "TRACE"),
        Level::DEBUG => ("\x1b[34m", "DEBUG"),
        Level::INFO => ("\x1b[32m", " INFO"),
        Level::WARN => ("\x1b[33m", " WARN"),
        Level::ERROR => ("\x1b[31m", "ERROR"),
    };
    styled(writer, color, text)
}

/// Writes `value` wrapped in an ANSI style when the writer supports it.
fn styled(writer: &mut Writer<'_>, style: &str, value: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{style}{value}{RESET}")
    } else {
        write!(writer, "{value}")
    }
}

/// Advances the step counter shown in log lines. Called once per simulation step.
pub fn increment_step() {
    STEP_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn get_step_count() -> u64 {
    STEP_COUNTER.load(Ordering::Relaxed)
}
