//! Active call command handlers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use opsdeck_core::format::format_duration;
use opsdeck_core::summary::{CallSummary, call_summary};
use opsdeck_core::{
    ActiveCall, CallBoard, EntityId, InMemoryRepository, Repository, spawn_duration_ticker,
};

use crate::cli::{CallsArgs, CallsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Tone};
use crate::state::Session;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CallRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Caller")]
    caller: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Menu")]
    menu: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

impl From<&Arc<ActiveCall>> for CallRow {
    fn from(c: &Arc<ActiveCall>) -> Self {
        Self {
            id: c.id.to_string(),
            caller: c.display_name().to_owned(),
            number: c.caller_number.clone(),
            menu: c.current_menu.clone(),
            status: c.status.to_string(),
            channel: c.channel.clone(),
            duration: format_duration(c.duration_secs),
        }
    }
}

fn summary_detail(s: &CallSummary, color: bool) -> String {
    [
        format!("Total:       {}", s.total),
        format!("Active:      {}", output::paint(&s.active.to_string(), Tone::Good, color)),
        format!("On hold:     {}", output::paint(&s.on_hold.to_string(), Tone::Warn, color)),
        format!("Ringing:     {}", s.ringing),
        format!("Transferred: {}", output::paint(&s.transferred.to_string(), Tone::Muted, color)),
        format!("Avg length:  {}", format_duration(s.avg_duration_secs)),
    ]
    .join("\n")
}

fn render_board(calls: &[Arc<ActiveCall>], global: &GlobalOpts) -> String {
    output::render_list(&global.output, calls, |x| CallRow::from(x), |c| c.id.to_string())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: CallsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let board = CallBoard::new(session.store().calls());

    match args.command {
        CallsCommand::List => {
            board.refresh_durations(Utc::now());
            let out = render_board(&board.calls(), global);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CallsCommand::Summary => {
            board.refresh_durations(Utc::now());
            let summary = call_summary(&board.calls());
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &summary,
                |s| summary_detail(s, color),
                |s| s.total.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CallsCommand::Hangup { call } => {
            let id = EntityId::from(call.as_str());
            let existing = session.store().calls().require(&id)?;
            if !util::confirm(
                &format!("Hang up {} ({})?", existing.display_name(), existing.channel),
                "calls hangup",
                global.yes,
            )? {
                return Ok(());
            }
            let dropped = board.hangup(&id)?;
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Hung up {}", dropped.channel);
            }
            Ok(())
        }

        CallsCommand::Transfer { call } => {
            let updated = board.transfer(&EntityId::from(call.as_str()))?;
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ {} marked transferred", updated.channel);
            }
            Ok(())
        }

        CallsCommand::Watch { interval, updates } => {
            watch(session, Duration::from_secs(interval.max(1)), updates, global).await
        }
    }
}

/// Redraw the board each time the ticker changes it. Works on a private
/// copy of the calls; nothing is written back.
async fn watch(
    session: &Session,
    period: Duration,
    updates: Option<u32>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let repo = Arc::new(InMemoryRepository::with_entities(
        session.store().calls().to_vec(),
    ));
    let board = Arc::new(CallBoard::new(Arc::clone(&repo)));
    board.refresh_durations(Utc::now());

    let mut stream = repo.subscribe();
    let cancel = CancellationToken::new();
    let ticker = spawn_duration_ticker(Arc::clone(&board), period, cancel.clone());

    let mut remaining = updates;
    let mut snapshot = stream.latest();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if matches!(global.output, OutputFormat::Table) && !global.quiet {
            println!("── {} ──", Utc::now().format("%H:%M:%S"));
        }
        output::print_output(&render_board(&snapshot, global), global.quiet);

        if let Some(n) = remaining.as_mut() {
            *n = n.saturating_sub(1);
            if *n == 0 {
                break;
            }
        }

        tokio::select! {
            _ = &mut ctrl_c => break,
            next = stream.changed() => match next {
                Some(calls) => snapshot = calls,
                None => break,
            },
        }
    }

    cancel.cancel();
    if let Err(e) = ticker.await {
        tracing::debug!(error = %e, "duration ticker ended abnormally");
    }
    Ok(())
}
