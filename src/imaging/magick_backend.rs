//! ImageMagick backend: every operation is one child process.
//!
//! | Operation | Invocation |
//! |---|---|
//! | Identify | `identify -format '%[fx:w]x%[fx:h]\n' <source>` (first frame read) |
//! | Resize | `convert <source> <mode steps> -strip -quality Q <output>` |
//!
//! Commands are built by [`MagickCommand`] and spawned directly, with stdin
//! closed and stdout/stderr captured. A non-zero exit status is an error; the
//! output file is whatever the tool left behind (no temp-file swap).

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{parse_dimensions, validate_target};
use super::command::{Invocation, MagickCommand, ToolSet};
use super::params::ResizeParams;
use crate::config::{ToolConfig, ToolFlavor};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::sync::OnceLock;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct MagickBackend {
    config: ToolConfig,
    tools: OnceLock<ToolSet>,
}

impl MagickBackend {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            tools: OnceLock::new(),
        }
    }

    /// Backend with an explicit tool set, skipping flavor detection.
    pub fn with_tools(config: ToolConfig, tools: ToolSet) -> Self {
        Self {
            config,
            tools: OnceLock::from(tools),
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Executables in use. For [`ToolFlavor::Auto`] the first call runs
    /// `magick -version` and falls back to the legacy executables.
    pub fn tools(&self) -> &ToolSet {
        self.tools.get_or_init(|| {
            let flavor = match self.config.flavor {
                ToolFlavor::Auto if responds_to_version(&self.config.magick_program) => {
                    ToolFlavor::Magick7
                }
                ToolFlavor::Auto => ToolFlavor::Legacy,
                explicit => explicit,
            };
            debug!("using {flavor:?} ImageMagick tools");
            ToolSet::for_flavor(flavor, &self.config)
        })
    }

    /// Whether the convert executable runs at all.
    pub fn is_available(&self) -> bool {
        responds_to_version(&self.tools().convert.executable)
    }

    /// Run a command and return its captured output.
    ///
    /// Fails if the process cannot be started, exits non-zero, or outlives
    /// the configured timeout (in which case it is killed).
    pub fn run(&self, command: &MagickCommand) -> Result<Output, BackendError> {
        let invocation = command.to_invocation(self.tools());
        execute(&invocation, self.config.timeout())
    }
}

impl Default for MagickBackend {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}

impl ImageBackend for MagickBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let command = MagickCommand::identify(path);
        let output = self.run(&command)?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let line = match stdout.lines().next() {
            Some(line) if !line.trim().is_empty() => line,
            _ => {
                return Err(BackendError::CommandExecutionFailed {
                    command: command.to_invocation(self.tools()).to_string(),
                    code: output.status.code(),
                });
            }
        };

        let (width, height) =
            parse_dimensions(line).ok_or_else(|| BackendError::MalformedOutput {
                command: command.to_invocation(self.tools()).to_string(),
                output: line.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        validate_target(params.width, params.height)?;
        self.run(&MagickCommand::resize(params))?;
        Ok(())
    }
}

fn responds_to_version(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn execute(invocation: &Invocation, timeout: Option<Duration>) -> Result<Output, BackendError> {
    let rendered = invocation.to_string();
    debug!("running: {rendered}");

    let mut child = invocation
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| BackendError::Spawn {
            command: rendered.clone(),
            source,
        })?;

    let output = match timeout {
        None => child.wait_with_output().map_err(|source| BackendError::Spawn {
            command: rendered.clone(),
            source,
        })?,
        Some(limit) => wait_with_deadline(&mut child, limit).map_err(|err| match err {
            WaitError::Io(source) => BackendError::Spawn {
                command: rendered.clone(),
                source,
            },
            WaitError::TimedOut => {
                warn!("timed out after {}s: {rendered}", limit.as_secs());
                BackendError::Timeout {
                    command: rendered.clone(),
                    seconds: limit.as_secs(),
                }
            }
        })?,
    };

    if !output.status.success() {
        debug!(
            "exit {:?}, stderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
        return Err(BackendError::CommandExecutionFailed {
            command: rendered,
            code: output.status.code(),
        });
    }

    Ok(output)
}

enum WaitError {
    Io(std::io::Error),
    TimedOut,
}

enum Stream {
    Stdout,
    Stderr,
}

/// Drain stdout/stderr on their own threads so a chatty child cannot block
/// on a full pipe while we poll for its exit. Each thread sends its buffer
/// once the pipe closes; returns how many buffers to expect.
fn spawn_readers(child: &mut Child) -> (Receiver<(Stream, Vec<u8>)>, usize) {
    fn drain<R: Read + Send + 'static>(
        pipe: Option<R>,
        stream: Stream,
        tx: &Sender<(Stream, Vec<u8>)>,
    ) -> usize {
        let Some(mut pipe) = pipe else { return 0 };
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send((stream, buf));
        });
        1
    }
    let (tx, rx) = mpsc::channel();
    let pending = drain(child.stdout.take(), Stream::Stdout, &tx)
        + drain(child.stderr.take(), Stream::Stderr, &tx);
    (rx, pending)
}

/// Wait for the child and its output, both bounded by the same deadline.
///
/// A background process started by the child can inherit its pipes and keep
/// them open after the child exits. Collection then stops at the deadline and
/// the reader threads are left to finish on their own; that process is not
/// killed.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<Output, WaitError> {
    let deadline = Instant::now() + limit;
    let (rx, pending) = spawn_readers(child);

    let status = loop {
        if let Some(status) = child.try_wait().map_err(WaitError::Io)? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WaitError::TimedOut);
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let mut output = Output {
        status,
        stdout: Vec::new(),
        stderr: Vec::new(),
    };
    for _ in 0..pending {
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok((Stream::Stdout, buf)) => output.stdout = buf,
            Ok((Stream::Stderr, buf)) => output.stderr = buf,
            Err(RecvTimeoutError::Timeout) => return Err(WaitError::TimedOut),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(output)
}
