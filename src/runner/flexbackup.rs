//! flexbackup subprocess runner
//!
//! Renders the set's configuration, runs
//! `flexbackup [-n] -c <conf> -level <level> -set <set> [extra args]` and
//! streams its output into the log until it exits. Runs have no timeout.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{info, warn};

use super::template::ArchiverTemplate;
use super::wrappers::WrapperScripts;
use super::BackupRunner;
use crate::config::BackupConfig;
use crate::error::{BackupError, BackupResult};
use crate::models::BackupLevel;
use crate::storage::{write_atomic, FsSnapshotStore};

/// Runs the flexbackup archiver for one set at a time
pub struct FlexbackupRunner<'a> {
    config: &'a BackupConfig,
    template: ArchiverTemplate,
    wrappers: WrapperScripts,
    store: FsSnapshotStore,
    dry_run: bool,
}

impl<'a> FlexbackupRunner<'a> {
    /// Load the template and generate the wrapper scripts
    pub fn new(config: &'a BackupConfig, dry_run: bool) -> BackupResult<Self> {
        let template = ArchiverTemplate::load(&config.template_file)?;
        Self::with_template(config, template, dry_run)
    }

    /// Use an already loaded template
    pub fn with_template(
        config: &'a BackupConfig,
        template: ArchiverTemplate,
        dry_run: bool,
    ) -> BackupResult<Self> {
        Ok(Self {
            config,
            template,
            wrappers: WrapperScripts::create()?,
            store: FsSnapshotStore::new(&config.dest_directory),
            dry_run,
        })
    }

    /// Arguments passed to the archiver
    pub fn command_args(&self, conf: &Path, set: &str, level: BackupLevel) -> Vec<String> {
        let mut args = Vec::new();
        if self.dry_run {
            args.push("-n".to_string());
        }
        args.extend([
            "-c".to_string(),
            conf.display().to_string(),
            "-level".to_string(),
            level.to_string(),
            "-set".to_string(),
            set.to_string(),
        ]);
        args.extend(self.config.archiver.extra_args.iter().cloned());
        args
    }

    /// Render and write the archiver configuration of a set
    fn write_conf(&self, set: &str) -> BackupResult<PathBuf> {
        let text = self.template.render_for(
            self.config,
            set,
            &self.store.current_link(set),
            self.wrappers.gzip(),
            self.wrappers.tar(),
        )?;
        let conf = self.wrappers.conf_file();
        write_atomic(&conf, &text)?;
        Ok(conf)
    }

    fn execute(&self, set: &str, args: &[String]) -> BackupResult<()> {
        let program = &self.config.archiver.program;
        info!(set, "Executing command: {} {}", program, args.join(" "));

        let runner_error = |reason: String| BackupError::Runner {
            set: set.to_string(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| runner_error(format!("failed to start {}: {}", program, e)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain stderr alongside stdout so neither pipe fills up
        std::thread::scope(|scope| {
            if let Some(stderr) = stderr {
                scope.spawn(move || stream_lines(stderr, |line| warn!(set, "{}", line)));
            }
            if let Some(stdout) = stdout {
                stream_lines(stdout, |line| info!(set, "{}", line));
            }
        });

        let status = child
            .wait()
            .map_err(|e| runner_error(format!("failed to wait for {}: {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(runner_error(format!("{} exited with {}", program, status)))
        }
    }
}

fn stream_lines<R: Read>(reader: R, mut log: impl FnMut(&str)) {
    for line in BufReader::new(reader).lines().map_while(Result::ok) {
        log(&line);
    }
}

impl BackupRunner for FlexbackupRunner<'_> {
    fn run(&self, set: &str, level: BackupLevel) -> BackupResult<()> {
        let conf = self.write_conf(set).map_err(|e| BackupError::Runner {
            set: set.to_string(),
            reason: e.to_string(),
        })?;
        let args = self.command_args(&conf, set, level);
        self.execute(set, &args)
    }
}
