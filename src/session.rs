//! The interactive keep/retry/cancel loop.

use crate::answer::{fetch_answer, StructuredAnswer};
use crate::config::Config;
use crate::llm::CompletionProvider;
use crate::note::FormattedNote;
use crate::readwise::{HighlightRecord, NoteProvider, PersistStatus};
use anyhow::Result;
use std::io::{BufRead, Write};

pub const CHOICE_PROMPT: &str = "Do you want to (k)eep, (r)etry, or (c)ancel? ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Retry,
    Cancel,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Kept { stored: bool },
    Cancelled,
}

pub fn parse_choice(line: &str) -> Option<Decision> {
    match line.trim().to_lowercase().as_str() {
        "k" => Some(Decision::Keep),
        "r" => Some(Decision::Retry),
        "c" => Some(Decision::Cancel),
        _ => None,
    }
}

/// Shows `note` and blocks until the user picks k, r or c.
/// End of input counts as cancel.
pub fn prompt_decision<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    note: &FormattedNote,
) -> Result<Decision> {
    loop {
        writeln!(out, "\n📌 Optimized Highlight for Readwise:")?;
        writeln!(out, "{}", note.title)?;
        writeln!(out, "{}", note.body)?;
        write!(out, "{CHOICE_PROMPT}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(Decision::Cancel);
        }

        match parse_choice(&line) {
            Some(decision) => return Ok(decision),
            None => {
                tracing::debug!(input = %line.trim(), "unrecognised choice");
                writeln!(
                    out,
                    "❌ Invalid input. Please enter 'k' for keep, 'r' for retry, or 'c' for cancel."
                )?;
            }
        }
    }
}

/// Sends one highlight. Failures are reported and swallowed; returns whether it was stored.
pub async fn persist_note<W: Write>(
    notes: &dyn NoteProvider,
    record: &HighlightRecord,
    out: &mut W,
) -> Result<bool> {
    writeln!(out, "📤 Sending to Readwise...")?;

    match notes.persist(record).await {
        Ok(PersistStatus::Stored) => {
            tracing::info!(title = %record.title, "highlight stored");
            writeln!(out, "✅ Successfully sent to Readwise!")?;
            Ok(true)
        }
        Ok(PersistStatus::Rejected { status, body }) => {
            tracing::error!(status, %body, "highlight rejected");
            writeln!(out, "❌ Failed to send to Readwise ({status}): {body}")?;
            Ok(false)
        }
        Err(e) => {
            tracing::error!(error = %e, "error sending highlight");
            writeln!(out, "❌ Error sending to Readwise: {e:#}")?;
            Ok(false)
        }
    }
}

/// Runs query, render and decide until the user keeps or cancels.
/// Every retry queries again with the same prompt.
pub async fn run_session<R: BufRead, W: Write>(
    prompt: &str,
    completion: &dyn CompletionProvider,
    notes: &dyn NoteProvider,
    config: &Config,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome> {
    loop {
        writeln!(out, "🔍 Sending prompt to {}...", config.model)?;
        let answer = fetch_answer(completion, prompt).await;
        if answer == StructuredAnswer::fallback() {
            writeln!(out, "❌ Could not get a response from {}.", config.model)?;
        } else {
            writeln!(out, "✅ Response received from {}.", config.model)?;
        }
        writeln!(out, "\n📝 Response:\n{}\n", answer.answer)?;

        let note = FormattedNote::from(&answer);
        match prompt_decision(input, out, &note)? {
            Decision::Keep => {
                writeln!(out, "📥 Keeping the response...")?;
                let record = HighlightRecord::new(&answer, &note, config);
                let stored = persist_note(notes, &record, out).await?;
                return Ok(Outcome::Kept { stored });
            }
            Decision::Retry => {
                writeln!(out, "🔄 Retrying...")?;
            }
            Decision::Cancel => {
                writeln!(out, "🚫 Cancelled.")?;
                return Ok(Outcome::Cancelled);
            }
        }
    }
}
