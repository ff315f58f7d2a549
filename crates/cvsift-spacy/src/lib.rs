use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;

use cvsift_core::{NlpBackend, NlpError, ParsedDoc};

pub mod protocol;

pub const DEFAULT_PYTHON: &str = "python3";
pub const DEFAULT_MODEL: &str = "en_core_web_sm";

const WORKER_SCRIPT: &str = include_str!("worker.py");

/// spaCy implementation of [`NlpBackend`].
///
/// [`start()`](Self::start) launches one Python worker that loads the model
/// once; every [`parse()`](NlpBackend::parse) call is a single request/reply
/// over the worker's stdin/stdout. The worker is killed when the backend is
/// dropped.
pub struct SpacyBackend {
    name: String,
    worker: Mutex<Worker>,
}

struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl SpacyBackend {
    /// Start a worker with `python` and load `model`.
    ///
    /// Fails with [`NlpError::Unavailable`] if the interpreter cannot be
    /// launched, spaCy is missing, or the model cannot be loaded.
    pub fn start(python: &str, model: &str) -> Result<Self, NlpError> {
        tracing::debug!(python, model, "starting spaCy worker");
        Self::launch(worker_command(python, model), python, model)
    }

    fn launch(mut command: Command, python: &str, model: &str) -> Result<Self, NlpError> {
        let mut child = command
            .spawn()
            .map_err(|e| NlpError::Unavailable(format!("failed to launch {python}: {e}")))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(NlpError::Unavailable("worker pipes unavailable".into()));
        };
        let mut worker = Worker {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        let ready = match worker.read_line() {
            Ok(Some(line)) => protocol::decode_ready(&line),
            Ok(None) => Err(NlpError::Unavailable(format!(
                "{python} exited before loading model {model}"
            ))),
            Err(e) => Err(NlpError::Unavailable(e.to_string())),
        };
        let ready = match ready {
            Ok(ready) => ready,
            Err(e) => {
                worker.shutdown();
                return Err(e);
            }
        };

        let name = match &ready.version {
            Some(version) => format!("spacy/{}@{}", ready.model, version),
            None => format!("spacy/{}", ready.model),
        };
        tracing::info!(model = %name, "spaCy model loaded");

        Ok(Self {
            name,
            worker: Mutex::new(worker),
        })
    }
}

fn worker_command(python: &str, model: &str) -> Command {
    let mut command = Command::new(python);
    command
        .arg("-u")
        .arg("-c")
        .arg(WORKER_SCRIPT)
        .arg(model)
        .env("PYTHONIOENCODING", "utf-8")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    command
}

impl Worker {
    /// Read one reply line; `None` means the worker closed its stdout.
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        let n = self.stdout.read_line(&mut line)?;
        Ok((n > 0).then_some(line))
    }

    fn shutdown(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl NlpBackend for SpacyBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, text: &str) -> Result<ParsedDoc, NlpError> {
        let request = protocol::encode_request(text)?;
        let mut worker = self
            .worker
            .lock()
            .map_err(|_| NlpError::Worker("worker lock poisoned".into()))?;

        worker.stdin.write_all(request.as_bytes())?;
        worker.stdin.flush()?;

        let line = worker
            .read_line()?
            .ok_or_else(|| NlpError::Worker("worker exited mid-request".into()))?;
        let doc = protocol::decode_doc(&line)?;
        tracing::debug!(
            model = %self.name,
            entities = doc.entities.len(),
            tokens = doc.tokens.len(),
            "parsed document"
        );
        Ok(doc)
    }
}
