//! Line-delimited JSON host: one tool call per input line, one reply per call

use crate::error::AppResult;
use crate::tools::{ToolCall, Toolbox, render};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Reply written back for one tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub ok: bool,
    pub output: String,
}

/// Handle one input line
///
/// Blank lines produce no reply. A line that is not a valid tool call produces an
/// error reply; it never stops the host.
pub async fn handle_line(toolbox: &mut Toolbox, line: &str) -> Option<Reply> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let reply = match serde_json::from_str::<ToolCall>(line) {
        Ok(call) => {
            let result = toolbox.invoke(call).await;
            Reply {
                ok: result.is_ok(),
                output: render(&result),
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "malformed tool call");
            Reply {
                ok: false,
                output: format!("Invalid tool call: {}", e),
            }
        }
    };
    Some(reply)
}

/// Serve tool calls from `reader` until it is exhausted, writing replies to `writer`
pub async fn serve<R, W>(toolbox: &mut Toolbox, reader: R, mut writer: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let Some(reply) = handle_line(toolbox, &line).await else {
            continue;
        };

        let mut encoded = serde_json::to_string(&reply)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}
