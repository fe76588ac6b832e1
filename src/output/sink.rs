//! Persistence collaborators for recorded run data
//!
//! The core hands periodic batches of body-trajectory rows to a
//! `PersistenceSink` and, at run end, the initial/final tracer phase-space
//! arrays. The sink owns the file layout; the core never formats output
//! itself beyond these calls.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::simulation::driver::BodyRecord;
use crate::simulation::states::NVec3;

/// Tracer phase-space arrays captured at a single instant
#[derive(Debug, Clone, Default)]
pub struct TracerSnapshot {
    pub m: Vec<f64>,
    pub x: Vec<NVec3>,
    pub v: Vec<NVec3>,
}

/// Receiver for periodic history flushes and the end-of-run tracer states
pub trait PersistenceSink {
    /// Append a batch of not-yet-flushed history rows
    fn flush(&mut self, rows: &[BodyRecord]) -> Result<()>;

    /// Called once, after the loop completes or aborts, with the tracer
    /// configuration at run start and at run end
    fn finalize(&mut self, initial: &TracerSnapshot, fin: &TracerSnapshot) -> Result<()>;
}

/// In-memory sink, used by tests and by callers that post-process in place
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<BodyRecord>,
    pub initial_tracers: TracerSnapshot,
    pub final_tracers: TracerSnapshot,
    pub finalized: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceSink for MemorySink {
    fn flush(&mut self, rows: &[BodyRecord]) -> Result<()> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn finalize(&mut self, initial: &TracerSnapshot, fin: &TracerSnapshot) -> Result<()> {
        self.initial_tracers = initial.clone();
        self.final_tracers = fin.clone();
        self.finalized = true;
        Ok(())
    }
}

/// CSV sink: one row per saved step with the body masses and phase-space
/// vectors, plus a sibling `<stem>_tracers.csv` holding the initial and final
/// tracer configurations
pub struct CsvSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "t,m1,m2,x1x,x1y,x1z,v1x,v1y,v1z,x2x,x2y,x2z,v2x,v2y,v2z"
        )?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    fn tracer_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run".into());
        self.path.with_file_name(format!("{stem}_tracers.csv"))
    }
}

impl PersistenceSink for CsvSink {
    fn flush(&mut self, rows: &[BodyRecord]) -> Result<()> {
        for r in rows {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                r.t,
                r.m1,
                r.m2,
                r.x1.x,
                r.x1.y,
                r.x1.z,
                r.v1.x,
                r.v1.y,
                r.v1.z,
                r.x2.x,
                r.x2.y,
                r.x2.z,
                r.v2.x,
                r.v2.y,
                r.v2.z,
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn finalize(&mut self, initial: &TracerSnapshot, fin: &TracerSnapshot) -> Result<()> {
        self.writer.flush()?;

        if initial.x.is_empty() && fin.x.is_empty() {
            return Ok(());
        }

        let path = self.tracer_path();
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(w, "which,i,m,x,y,z,vx,vy,vz")?;
        for (which, snap) in [("initial", initial), ("final", fin)] {
            for i in 0..snap.x.len() {
                let (x, v) = (snap.x[i], snap.v[i]);
                writeln!(
                    w,
                    "{which},{i},{},{},{},{},{},{},{}",
                    snap.m[i], x.x, x.y, x.z, v.x, v.y, v.z
                )?;
            }
        }
        w.flush()?;
        info!("wrote tracer states to {}", path.display());
        Ok(())
    }
}
