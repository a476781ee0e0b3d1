use log::debug;
use sns_tool_discovery::DiscoveryOutcome;
use std::io::{self, Write};

pub(crate) fn warn(msg: &str) {
    let _ = writeln!(io::stderr(), "sns-tool (warning): {msg}");
}

pub(crate) fn error(err: &anyhow::Error) {
    let _ = writeln!(io::stderr(), "sns-tool (error): {err:#}");
}

/// Warn about every topic that had to be skipped
pub(crate) fn print_skipped_topics(outcome: &DiscoveryOutcome) {
    let stderr = io::stderr();
    let _ = write_skipped_topics(&mut stderr.lock(), outcome);
    debug!("Reported {} skipped topics", outcome.skipped.len());
}

fn write_skipped_topics<W: Write>(w: &mut W, outcome: &DiscoveryOutcome) -> io::Result<()> {
    let skipped = outcome
        .skipped
        .iter()
        .filter(|err| err.is_recoverable())
        .collect::<Vec<_>>();
    for err in &skipped {
        writeln!(w, "sns-tool (warning): {err}")?;
    }
    if !skipped.is_empty() {
        writeln!(
            w,
            "sns-tool: {} of {} topics could not be checked",
            skipped.len(),
            outcome.topics_scanned
        )?;
    }
    Ok(())
}
