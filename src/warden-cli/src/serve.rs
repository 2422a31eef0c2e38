//! Feeds inbound messages through the pipeline, one task per message.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use warden_pipeline::{AuthorizationPipeline, ConfigurationFault, InboundMessage, Outcome};

use crate::records::Record;

type Run = (i64, Result<Outcome, ConfigurationFault>);

/// Reads JSON-line messages from `input` until it closes and writes
/// notices and outcomes to `output`.
///
/// Returns an error as soon as the pipeline halts.
pub async fn serve<R, W>(
    pipeline: Arc<AuthorizationPipeline>,
    mut records: mpsc::UnboundedReceiver<Record>,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut halt = pipeline.subscribe_halt();
    let mut tasks: JoinSet<Run> = JoinSet::new();
    let mut input_open = true;

    loop {
        if !input_open && tasks.is_empty() {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("failed to read input")? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match serde_json::from_str::<InboundMessage>(&line) {
                        Ok(message) => {
                            let pipeline = pipeline.clone();
                            tasks.spawn(async move {
                                let result = pipeline.process(&message).await;
                                (message.message_id, result)
                            });
                        }
                        Err(e) => warn!("Skipping malformed message: {}", e),
                    },
                    None => {
                        debug!("input closed, waiting for {} runs", tasks.len());
                        input_open = false;
                    }
                }
            }
            Some(record) = records.recv() => {
                write_record(&mut output, &record).await?;
            }
            Some(joined) = tasks.join_next() => {
                let (message_id, result) = joined.context("pipeline task failed")?;
                match result {
                    Ok(outcome) => {
                        flush_notices(&mut records, &mut output).await?;
                        write_record(&mut output, &Record::Outcome { message_id, outcome }).await?;
                    }
                    Err(ConfigurationFault::Halted) => {}
                    Err(fault) => {
                        tasks.abort_all();
                        bail!("pipeline halted: {}", fault);
                    }
                }
            }
            changed = halt.changed() => {
                changed.context("halt signal dropped")?;
                if *halt.borrow_and_update() {
                    tasks.abort_all();
                    bail!("pipeline halted on a configuration fault");
                }
            }
        }
    }

    flush_notices(&mut records, &mut output).await?;
    output.flush().await?;
    info!("input drained");
    Ok(())
}

async fn flush_notices<W>(records: &mut mpsc::UnboundedReceiver<Record>, output: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Ok(record) = records.try_recv() {
        write_record(output, &record).await?;
    }
    Ok(())
}

async fn write_record<W>(output: &mut W, record: &Record) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    Ok(())
}
