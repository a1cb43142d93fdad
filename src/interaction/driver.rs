//! Drives one session's output to completion.

use super::classify::classify_line;
use crate::command::CommandKind;
use crate::error::SessionError;
use crate::session::LineChannel;
use crate::ui::Ui;
use tracing::{debug, info};

/// Consume `channel` until its output ends, answering prompts and accumulating
/// the surviving lines in arrival order.
pub async fn drive<C>(
    channel: &mut C,
    kind: CommandKind,
    show_output: bool,
    ui: &dyn Ui,
) -> Result<Vec<String>, SessionError>
where
    C: LineChannel + ?Sized,
{
    let mut collected = Vec::new();
    while let Some(line) = channel.next_line().await {
        if show_output {
            ui.output_line(&line);
        }
        let class = classify_line(kind, &line);

        if let Some(rule) = class.prompt {
            let answer = rule.response.resolve(ui).await;
            info!(command = %kind, prompt = rule.needle, answer = %answer, "Answering prompt");
            channel.send_line(&answer).await?;
        }
        if let Some(notice) = class.notice {
            ui.notify(notice);
        }
        match class.keep {
            Some(kept) => collected.push(kept),
            None => debug!(command = %kind, line = %line, "Filtered output line"),
        }
    }
    Ok(collected)
}
