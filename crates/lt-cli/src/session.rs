//! Interactive session loop and command dispatch.
//!
//! Reads operator lines, stamps plain lines as tags, and routes `!`
//! commands to the store. All presentation lives here; the store only
//! returns keys and errors.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use lt_core::{
    CORRECTION_NOISE_SECONDS, MAX_OFFSET_SECONDS, SessionClock, StoreError, TagKey, TagStore,
};

use crate::command::{self, Command, Input};

/// Longest echoed edit text before elision.
const EDIT_ECHO_LIMIT: usize = 16;

/// Supplies an authoritative session start instant for a video.
///
/// The session never performs the lookup itself; it only consumes the
/// corrected instant.
pub trait StartTimeSource {
    fn live_stream_start(&self, video_id: &str) -> Result<DateTime<Utc>>;
}

/// [`StartTimeSource`] backed by the YouTube Data API.
///
/// Bridges the synchronous session loop to the async client with a
/// dedicated runtime.
#[derive(Debug)]
pub struct YouTubeStartTime {
    client: lt_youtube::Client,
    runtime: tokio::runtime::Runtime,
}

impl YouTubeStartTime {
    pub fn new(api_key: &str) -> Result<Self> {
        let client =
            lt_youtube::Client::new(api_key).context("failed to create YouTube client")?;
        let runtime =
            tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
        Ok(Self { client, runtime })
    }
}

impl StartTimeSource for YouTubeStartTime {
    fn live_stream_start(&self, video_id: &str) -> Result<DateTime<Utc>> {
        Ok(self
            .runtime
            .block_on(self.client.live_stream_start(video_id))?)
    }
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// One recording session: the tag store, its clock, and an optional
/// start-time source.
#[derive(Debug)]
pub struct Session<S> {
    store: TagStore,
    clock: SessionClock,
    start_source: Option<S>,
}

impl<S: StartTimeSource> Session<S> {
    pub fn new(clock: SessionClock, start_source: Option<S>) -> Self {
        Self {
            store: TagStore::new(),
            clock,
            start_source,
        }
    }

    /// Runs the session loop against real time until quit or EOF.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<()> {
        self.run_with(input, output, Utc::now)
    }

    /// Runs the session loop with an injectable time source.
    pub fn run_with<R, W, F>(&mut self, input: &mut R, output: &mut W, mut now: F) -> Result<()>
    where
        R: BufRead,
        W: Write,
        F: FnMut() -> DateTime<Utc>,
    {
        loop {
            let Some(line) = read_line(input)? else {
                // EOF: dump whatever was recorded, then end cleanly.
                if !self.store.is_empty() {
                    self.write_tags(output)?;
                }
                return Ok(());
            };
            match command::classify(&line) {
                Ok(Input::Tag(text)) => self.record_tag(output, &text, now())?,
                Ok(Input::Command(command)) => {
                    if self.dispatch(input, output, command)? == Flow::Quit {
                        return Ok(());
                    }
                }
                Err(err) => writeln!(output, "{err}")?,
            }
        }
    }

    /// Stamps `text` with the current elapsed time and stores it.
    fn record_tag<W: Write>(
        &mut self,
        output: &mut W,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let key = TagKey::from_duration(self.clock.elapsed_at(now));
        match self.store.insert(key, text) {
            Ok(stored) => writeln!(output, "{stored} {text}")?,
            Err(err) => writeln!(output, "{err}")?,
        }
        Ok(())
    }

    fn dispatch<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        command: Command,
    ) -> Result<Flow> {
        match command {
            Command::Flush => {
                self.write_tags(output)?;
                let answer = prompt(input, output, "Finished? ")?;
                if finished(&answer) {
                    return Ok(Flow::Quit);
                }
            }
            Command::Quit => return self.confirm_quit(input, output),
            Command::Adjust { index, delta } => {
                match self.store.adjust_by_index(index, delta, "") {
                    Ok(adjustment) => writeln!(
                        output,
                        "Tag at {} now at {}",
                        adjustment.old_key, adjustment.new_key
                    )?,
                    Err(err) => write_store_error(output, &err)?,
                }
            }
            Command::Edit { index, text } => match self.store.adjust_by_index(index, 0, &text) {
                Ok(adjustment) => writeln!(
                    output,
                    "Tag at {} now reads '{}'",
                    adjustment.old_key,
                    elide(&text)
                )?,
                Err(err) => write_store_error(output, &err)?,
            },
            Command::Offset {
                lower,
                delta,
                upper,
            } => {
                let moved = self.store.offset_range(lower, delta, upper);
                writeln!(output, "{delta} second offset applied to {moved} tags")?;
            }
            Command::Delete { index } => match self.store.delete_by_index(index) {
                Ok((key, text)) => writeln!(output, "Deleted tag: {key} {text}")?,
                Err(err) => write_store_error(output, &err)?,
            },
            Command::YtStart { url } => self.correct_from_video(input, output, &url)?,
        }
        Ok(Flow::Continue)
    }

    fn confirm_quit<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<Flow> {
        let answer = prompt(input, output, "Finished? ")?;
        if !finished(&answer) {
            return Ok(Flow::Continue);
        }
        if self.store.is_empty() {
            return Ok(Flow::Quit);
        }
        let warning = format!("Are you sure? {} tags are still loaded. ", self.store.len());
        let answer = prompt(input, output, &warning)?;
        if finished(&answer) {
            self.write_tags(output)?;
            return Ok(Flow::Quit);
        }
        Ok(Flow::Continue)
    }

    /// Corrects the session start from a live stream and, past the
    /// noise threshold, offers to shift the stored tags along.
    fn correct_from_video<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        url: &str,
    ) -> Result<()> {
        let Some(source) = &self.start_source else {
            writeln!(
                output,
                "No YouTube API key configured (set LT_API_KEY or api_key in config.toml)"
            )?;
            return Ok(());
        };
        let video_id = lt_youtube::video_id(url);
        let start = match source.live_stream_start(video_id) {
            Ok(start) => start,
            Err(err) => {
                tracing::debug!(video_id, "start time lookup failed");
                writeln!(output, "{err:#}")?;
                return Ok(());
            }
        };

        let delta = self.clock.correct_start(start);
        writeln!(output, "Start time adjusted by {delta}")?;
        if self.store.is_empty() || delta.abs() <= CORRECTION_NOISE_SECONDS {
            return Ok(());
        }

        let question = format!("Adjust {} existing tags? ", self.store.len());
        let answer = prompt(input, output, &question)?;
        if affirmative(&answer) {
            let moved = self.store.offset_range(0, delta, MAX_OFFSET_SECONDS);
            writeln!(output, "{delta} second offset applied to {moved} tags")?;
        } else {
            writeln!(output, "{} tags not adjusted", self.store.len())?;
        }
        Ok(())
    }

    /// Prints all tags ascending between `----` markers.
    fn write_tags<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "----")?;
        for (key, text) in self.store.iter() {
            writeln!(output, "{key} {text}")?;
        }
        writeln!(output, "----")
    }
}

/// Reads one line, stripping the trailing newline. `None` on EOF.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Writes a prompt without a newline and reads the answer.
///
/// EOF answers as an empty string, which no prompt treats as yes.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> io::Result<String> {
    write!(output, "{text}")?;
    output.flush()?;
    Ok(read_line(input)?.unwrap_or_default())
}

/// Finish prompts accept any answer starting `y`, `q`, or `e`.
fn finished(answer: &str) -> bool {
    answer
        .chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'y' | 'q' | 'e'))
}

/// The bulk-shift prompt only accepts a plain yes.
fn affirmative(answer: &str) -> bool {
    answer
        .chars()
        .next()
        .is_some_and(|c| c.to_ascii_lowercase() == 'y')
}

fn write_store_error<W: Write>(output: &mut W, err: &StoreError) -> io::Result<()> {
    match err {
        StoreError::IndexOutOfRange { index, count } => {
            // Report the index counted from the start, per the lookup's
            // snapshot of the count.
            let from_start = i64::try_from(*count).unwrap_or(i64::MAX).saturating_sub(*index);
            writeln!(output, "Tag at index {from_start} not found")
        }
        StoreError::NoSlotAvailable { .. } => writeln!(output, "{err}"),
    }
}

/// Shortens echoed edit text so long notes do not flood the console.
fn elide(text: &str) -> String {
    if text.chars().count() > EDIT_ECHO_LIMIT {
        let prefix: String = text.chars().take(EDIT_ECHO_LIMIT).collect();
        format!("{prefix}...")
    } else {
        text.to_string()
    }
}
