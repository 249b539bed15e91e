use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Event format that wraps each field in brackets:
/// `[TIMESTAMP] [LEVEL] [SPAN] [TARGET: FILE:LINE]: MESSAGE`
///
/// The location part is dropped when `show_location` is false, which keeps
/// console output short while the log file stays fully annotated.
#[derive(Debug, Clone, Copy)]
pub struct BracketedFormatter {
    pub show_location: bool,
}

impl Default for BracketedFormatter {
    fn default() -> Self {
        Self { show_location: true }
    }
}

impl<S, N> FormatEvent<S, N> for BracketedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let now = chrono::Utc::now();
        write!(writer, "[{}] ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;
        write!(writer, "[{:5}] ", metadata.level())?;

        // Innermost span if any, else the last path segment of the target
        let scope_name = ctx
            .event_scope()
            .and_then(|scope| scope.from_root().last().map(|span| span.name()))
            .unwrap_or_else(|| metadata.target().rsplit("::").next().unwrap_or("unknown"));
        write!(writer, "[{}] ", scope_name)?;

        match (self.show_location, metadata.file(), metadata.line()) {
            (true, Some(file), Some(line)) => {
                write!(writer, "[{}: {}:{}]: ", metadata.target(), file, line)?
            }
            _ => write!(writer, "[{}]: ", metadata.target())?,
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
