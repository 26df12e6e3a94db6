//! `tracing-subscriber` integration.

use crate::writer::RotatingWriter;
use tracing_subscriber::fmt::MakeWriter;

/// Lets a `tracing-subscriber` fmt layer write formatted events to a
/// rotating log file.
///
/// ```no_run
/// use creek::RotatingWriter;
///
/// let writer = RotatingWriter::new("logs/api.log", 10).unwrap();
/// tracing_subscriber::fmt().with_writer(writer).with_ansi(false).init();
/// ```
///
/// For a writer shared with other code, wrap it in an `Arc`;
/// `tracing-subscriber` implements `MakeWriter` for `Arc<W>` whenever `&W`
/// is a writer.
impl<'a> MakeWriter<'a> for RotatingWriter {
    type Writer = &'a RotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
