use std::io::{self, Write};

use serde::Serialize;

use crate::app::AnnotationBatch;
use crate::config::ConfigReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_batch(result: &AnnotationBatch) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_config(report: &ConfigReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, _event: crate::app::ProgressEvent) {}
}

pub struct StderrProgress;

impl crate::app::ProgressSink for StderrProgress {
    fn event(&self, event: crate::app::ProgressEvent) {
        eprintln!("{}", event.message);
    }
}
