//! Progress channel between the pipeline and whatever transport drains it

use bytes::Bytes;
use tokio::sync::mpsc;

use super::task::BatchTask;

pub type ProgressSender = mpsc::UnboundedSender<BatchTask>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<BatchTask>;

pub fn channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Pushes snapshots to the receiver. Once the receiver is gone the run keeps
/// going and further snapshots are dropped.
#[derive(Debug)]
pub struct ProgressReporter {
    sender: ProgressSender,
    disconnected: bool,
}

impl ProgressReporter {
    pub fn new(sender: ProgressSender) -> Self {
        Self {
            sender,
            disconnected: false,
        }
    }

    pub fn report(&mut self, task: &BatchTask) {
        if self.disconnected {
            return;
        }
        if self.sender.send(task.clone()).is_err() {
            self.disconnected = true;
            tracing::debug!("[BATCH] Progress receiver closed; continuing without a listener");
        }
    }
}

/// One snapshot as a newline-terminated JSON line
pub fn encode_line(task: &BatchTask) -> Result<Bytes, serde_json::Error> {
    let mut line = serde_json::to_vec(task)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::task::TaskState;

    #[test]
    fn encoded_line_is_single_terminated_object() {
        let line = encode_line(&BatchTask::pending("top", "Top Stories")).unwrap();
        let text = std::str::from_utf8(&line).unwrap();

        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(text.trim_end()).unwrap()["status"],
            "PENDING"
        );
    }

    #[test]
    fn reporter_survives_dropped_receiver() {
        let (tx, rx) = channel();
        let mut reporter = ProgressReporter::new(tx);
        drop(rx);

        let mut task = BatchTask::pending("top", "Top");
        reporter.report(&task);
        task.state = TaskState::Gathering;
        reporter.report(&task);

        assert!(reporter.disconnected);
    }
}
