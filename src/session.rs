use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::models::ConversationState;
use crate::services::conversation::process_turn;
use crate::state::AppState;

pub const BANNER: &str = "Hospital Clinic Appointment System (Type 'bye' to exit)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    EndOfInput,
    Interrupted,
}

// One interrupt future covers both the prompt and the turn in flight.
pub async fn run_session<R, W, I>(
    state: &AppState,
    input: R,
    out: &mut W,
    interrupt: I,
) -> anyhow::Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);

    writeln!(out, "{BANNER}")?;
    let mut lines = input.lines();
    let mut conv = ConversationState::new();

    loop {
        write!(out, "Human: ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut interrupt => return Ok(interrupted(out)?),
        };
        let Some(line) = line else {
            tracing::info!("end of input");
            return Ok(SessionEnd::EndOfInput);
        };
        if line.trim().is_empty() {
            continue;
        }

        let (next, outcome) = tokio::select! {
            turn = process_turn(state, conv, &line) => turn,
            _ = &mut interrupt => {
                tracing::warn!("interrupted mid-turn, abandoning it");
                return Ok(interrupted(out)?);
            }
        };
        conv = next;

        for reply in &outcome.replies {
            writeln!(out, "Assistant: {reply}")?;
        }
        if outcome.finished {
            return Ok(SessionEnd::Completed);
        }
    }
}

fn interrupted<W: Write>(out: &mut W) -> std::io::Result<SessionEnd> {
    writeln!(out)?;
    tracing::info!("interrupted, exiting");
    Ok(SessionEnd::Interrupted)
}
