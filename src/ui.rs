// Command handlers: the `talks` listing and the `new` submission. Both
// write to a caller-supplied writer so the binary can hand them stdout
// and tests can hand them a buffer.

use crate::api::{ApiClient, Talk};
use crate::cli::NewArgs;
use crate::error::TalksError;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use tracing::info;

/// Fetch the visible talks, narrow or order them, and print the summary
/// followed by one line per talk.
pub fn list_talks<W: Write>(api: &ApiClient, type_filter: &str, out: &mut W) -> Result<(), TalksError> {
    let spinner = spinner("Fetching talks...");
    let fetched = api.visible_talks();
    spinner.finish_and_clear();

    let talks = select_talks(fetched?, type_filter);
    write_talks(out, &talks)?;
    Ok(())
}

/// Validate the three required fields, then POST the talk.
///
/// Nothing is sent when a field is empty.
pub fn submit_talk<W: Write>(api: &ApiClient, args: &NewArgs, out: &mut W) -> Result<(), TalksError> {
    if args.name.is_empty() || args.kind.is_empty() || args.desc.is_empty() {
        return Err(TalksError::MissingField);
    }
    let talk = Talk::draft(args.name.as_str(), args.kind.as_str(), args.desc.as_str());

    let spinner = spinner("Submitting talk...");
    let sent = api.submit_talk(&talk);
    spinner.finish_and_clear();
    sent?;

    info!(name = %talk.name, kind = %talk.kind, "talk submitted");
    writeln!(out, "Talk submitted.")?;
    Ok(())
}

/// With a filter, keep exact `type` matches in server order. Without one,
/// sort everything by `type` (byte order, stable within a category).
pub fn select_talks(mut talks: Vec<Talk>, type_filter: &str) -> Vec<Talk> {
    if type_filter.is_empty() {
        talks.sort_by(|a, b| a.kind.as_bytes().cmp(b.kind.as_bytes()));
    } else {
        talks.retain(|t| t.kind == type_filter);
    }
    talks
}

pub fn format_talk(talk: &Talk) -> String {
    format!("[{}]: {} by {}", talk.kind, talk.desc, talk.name)
}

pub fn write_talks<W: Write>(out: &mut W, talks: &[Talk]) -> std::io::Result<()> {
    writeln!(out, "There are currently {} talks scheduled", talks.len())?;
    for talk in talks {
        writeln!(out, "{}", format_talk(talk))?;
    }
    Ok(())
}

/// Spinner on stderr while a request is in flight. indicatif hides it
/// when stderr is not a terminal.
fn spinner(msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner.tick();
    spinner
}
