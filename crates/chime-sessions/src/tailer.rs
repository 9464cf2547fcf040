//! Single-file follower for session logs.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;

use chime_events::{classify, ChimeEvent, Classification};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::registry::TailRegistry;

/// Follows one session log file and forwards classified events downstream.
///
/// Reads whole lines only: an unterminated tail at EOF stays buffered
/// across suspensions and is completed by a later read, so a write split
/// over two notifications still yields exactly one event. On EOF the
/// tailer parks on its wake signal; there is no polling.
pub(crate) struct Tailer {
    pub(crate) path: PathBuf,
    pub(crate) seek_end: bool,
    pub(crate) wake: Arc<Notify>,
    pub(crate) registry: Arc<TailRegistry>,
    pub(crate) events: mpsc::Sender<ChimeEvent>,
    pub(crate) cancel: CancellationToken,
    pub(crate) is_subagent: bool,
}

impl Tailer {
    /// Run until shutdown or an unrecoverable read error.
    ///
    /// The registry entry for this path is released as the very last step,
    /// preserving the one-tailer-per-path invariant: a path is claimable
    /// again only once this task is gone. A file that failed here will be
    /// retried on its next write notification.
    pub(crate) async fn run(self) {
        if let Err(e) = self.follow().await {
            warn!(path = %self.path.display(), error = %e, "tailer stopped");
        }
        self.registry.finish(&self.path).await;
    }

    async fn follow(&self) -> std::io::Result<()> {
        let mut file = File::open(&self.path).await?;
        if self.seek_end {
            file.seek(SeekFrom::End(0)).await?;
        }

        let mut reader = BufReader::new(file);
        // read_line appends, so a partial trailing line accumulates here
        // until the writer completes it.
        let mut line = String::new();

        loop {
            reader.read_line(&mut line).await?;

            if !line.ends_with('\n') {
                // EOF (possibly mid-line). Park until the watcher reports a
                // write on this path or shutdown is requested.
                tokio::select! {
                    () = self.cancel.cancelled() => return Ok(()),
                    () = self.wake.notified() => continue,
                }
            }

            let record = line.trim_end_matches(['\r', '\n']);
            if !record.is_empty() && !self.deliver(record).await {
                return Ok(());
            }
            line.clear();
        }
    }

    /// Classify and forward one complete line. Returns `false` when the
    /// pipeline is shutting down.
    async fn deliver(&self, record: &str) -> bool {
        match classify(record) {
            Ok(Classification::Event(mut ev)) => {
                ev.is_subagent = self.is_subagent;
                // Blocking send: a full ingress propagates backpressure to
                // file reading. Shutdown is observed alongside.
                tokio::select! {
                    () = self.cancel.cancelled() => return false,
                    sent = self.events.send(ev) => {
                        if sent.is_err() {
                            debug!(path = %self.path.display(), "event channel closed");
                            return false;
                        }
                    }
                }
            }
            Ok(Classification::Skip) => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding malformed line");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    fn bash_line(command: &str) -> String {
        format!(
            r#"{{"type":"assistant","sessionId":"s1","cwd":"/u/proj","timestamp":"T","message":{{"content":[{{"type":"tool_use","name":"Bash","input":{{"command":"{command}"}}}}]}}}}"#
        )
    }

    fn append(path: &std::path::Path, data: &str) {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        f.write_all(data.as_bytes()).unwrap();
        f.flush().unwrap();
    }

    struct Harness {
        _dir: TempDir,
        path: PathBuf,
        wake: Arc<Notify>,
        registry: Arc<TailRegistry>,
        events: mpsc::Receiver<ChimeEvent>,
        cancel: CancellationToken,
    }

    async fn start_tailer(initial: &str, seek_end: bool, is_subagent: bool) -> Harness {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.jsonl");
        append(&path, initial);

        let registry = Arc::new(TailRegistry::new());
        let wake = registry.begin(&path).await.unwrap();
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        let tailer = Tailer {
            path: path.clone(),
            seek_end,
            wake: Arc::clone(&wake),
            registry: Arc::clone(&registry),
            events: tx,
            cancel: cancel.clone(),
            is_subagent,
        };
        tokio::spawn(tailer.run());

        Harness {
            _dir: dir,
            path,
            wake,
            registry,
            events: rx,
            cancel,
        }
    }

    #[tokio::test]
    async fn test_reads_appended_lines_in_order() {
        let mut h = start_tailer("", false, false).await;

        append(&h.path, &(bash_line("first") + "\n" + &bash_line("second") + "\n"));
        h.wake.notify_one();

        let ev1 = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        let ev2 = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(ev1.detail, "first");
        assert_eq!(ev2.detail, "second");
    }

    #[tokio::test]
    async fn test_partial_line_spanning_two_writes_yields_one_event() {
        let mut h = start_tailer("", false, false).await;

        let line = bash_line("split write");
        let (head, tail) = line.split_at(line.len() / 2);

        append(&h.path, head);
        h.wake.notify_one();
        // Give the tailer a chance to observe the truncated tail.
        tokio::time::sleep(Duration::from_millis(100)).await;

        append(&h.path, &format!("{tail}\n"));
        h.wake.notify_one();

        let ev = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(ev.detail, "split write");
        assert!(h.events.try_recv().is_err(), "one write, one event");
    }

    #[tokio::test]
    async fn test_seek_end_ignores_existing_content() {
        let existing = bash_line("old history") + "\n";
        let mut h = start_tailer(&existing, true, false).await;

        // Let the tailer reach EOF before appending.
        tokio::time::sleep(Duration::from_millis(100)).await;
        append(&h.path, &(bash_line("fresh") + "\n"));
        h.wake.notify_one();

        let ev = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(ev.detail, "fresh");
    }

    #[tokio::test]
    async fn test_without_seek_end_reads_from_byte_zero() {
        let existing = bash_line("preexisting") + "\n";
        let mut h = start_tailer(&existing, false, false).await;

        let ev = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(ev.detail, "preexisting");
    }

    #[tokio::test]
    async fn test_crlf_and_blank_lines_tolerated() {
        let mut h = start_tailer("", false, false).await;

        append(&h.path, &format!("\r\n{}\r\n\n", bash_line("crlf")));
        h.wake.notify_one();

        let ev = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(ev.detail, "crlf");
    }

    #[tokio::test]
    async fn test_malformed_and_skip_lines_produce_no_events() {
        let mut h = start_tailer("", false, false).await;

        append(&h.path, "this is not json\n");
        append(
            &h.path,
            "{\"type\":\"file-history-snapshot\",\"sessionId\":\"s1\",\"cwd\":\"/u/proj\",\"timestamp\":\"T\"}\n",
        );
        append(&h.path, &(bash_line("after noise") + "\n"));
        h.wake.notify_one();

        let ev = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(ev.detail, "after noise");
    }

    #[tokio::test]
    async fn test_subagent_flag_is_applied() {
        let mut h = start_tailer("", false, true).await;

        append(&h.path, &(bash_line("sub") + "\n"));
        h.wake.notify_one();

        let ev = timeout(RECV_TIMEOUT, h.events.recv()).await.unwrap().unwrap();
        assert!(ev.is_subagent);
    }

    #[tokio::test]
    async fn test_shutdown_releases_registry_entry() {
        let h = start_tailer("", false, false).await;
        assert!(h.registry.is_tailing(&h.path).await);

        h.cancel.cancel();

        timeout(RECV_TIMEOUT, async {
            while h.registry.is_tailing(&h.path).await {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("registry entry should be removed on shutdown");
    }

    #[tokio::test]
    async fn test_open_failure_exits_and_releases_entry() {
        let registry = Arc::new(TailRegistry::new());
        let path = PathBuf::from("/nonexistent/chime/test.jsonl");
        let wake = registry.begin(&path).await.unwrap();
        let (tx, _rx) = mpsc::channel(1);

        let tailer = Tailer {
            path: path.clone(),
            seek_end: false,
            wake,
            registry: Arc::clone(&registry),
            events: tx,
            cancel: CancellationToken::new(),
            is_subagent: false,
        };
        tailer.run().await;

        assert!(!registry.is_tailing(&path).await);
    }
}
