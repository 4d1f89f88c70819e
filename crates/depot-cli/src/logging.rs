use std::io;

use nu_ansi_term::Color::{self, Blue, Magenta, Red, Yellow};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

fn level_tag(level: Level) -> Option<(Color, &'static str)> {
    match level {
        Level::TRACE => Some((Magenta, "[TRACE]")),
        Level::DEBUG => Some((Blue, "[DEBUG]")),
        Level::INFO => None,
        Level::WARN => Some((Yellow, "[WARN]")),
        Level::ERROR => Some((Red, "[ERROR]")),
    }
}

/// Prints INFO events bare so outcome lines read like plain output; every
/// other level gets a coloured tag.
pub struct LevelFormatter;

impl<S, N> FormatEvent<S, N> for LevelFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        if let Some((color, tag)) = level_tag(*event.metadata().level()) {
            write!(writer, "{} ", Colored(color, tag))?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Collects one formatted event and prints it with the progress bars
/// suspended. INFO goes to stdout, everything else to stderr.
struct EventWriter {
    buffer: Vec<u8>,
    stderr: bool,
}

impl io::Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let text = String::from_utf8_lossy(&self.buffer);
        let text = text.trim_end_matches('\n');
        crate::progress::suspend(|| {
            if self.stderr {
                eprintln!("{text}");
            } else {
                println!("{text}");
            }
        });
    }
}

struct SplitOutput;

impl<'a> MakeWriter<'a> for SplitOutput {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            buffer: Vec::new(),
            stderr: false,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        EventWriter {
            buffer: Vec::new(),
            stderr: *meta.level() != Level::INFO,
        }
    }
}

fn filter_level(args: &Args) -> Level {
    match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

const TARGETS: [&str; 6] = [
    "depot",
    "depot_config",
    "depot_core",
    "depot_db",
    "depot_dl",
    "depot_package",
];

pub fn setup_logging(args: &Args) {
    let level = filter_level(args);
    let directives = TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let builder = fmt::Subscriber::builder()
        .with_env_filter(directives)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(SplitOutput)
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(LevelFormatter).finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a tracing subscriber is already installed");
    }
}
