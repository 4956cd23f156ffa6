//! Reusable dycore and grid fixtures.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::rc::Rc;

use floe_core::{DimInfo, FieldKey, Registry, RegistryError, Section};
use floe_dycore::{DyCore, DyCoreError};

/// Host-side arrays for an `ewn x nsn` grid.
///
/// The vectors stay owned by the fixture; [`attach`](GridFixture::attach)
/// only aliases them, so the fixture must outlive any registry it is
/// attached to.
pub struct GridFixture {
    pub ewn: usize,
    pub nsn: usize,
    pub thck: Vec<f64>,
    pub usrf: Vec<f64>,
    pub topg: Vec<f64>,
    pub dim_info: Vec<i64>,
    pub time: Vec<f64>,
}

impl GridFixture {
    /// A grid with a linear thickness ramp and flat bed at zero.
    pub fn new(ewn: usize, nsn: usize) -> Self {
        let n = ewn * nsn;
        let thck: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let topg = vec![0.0; n];
        let usrf = thck.clone();
        Self {
            ewn,
            nsn,
            thck,
            usrf,
            topg,
            dim_info: vec![2, ewn as i64, nsn as i64],
            time: vec![0.0],
        }
    }

    /// Shape of every 2-D field on this grid.
    pub fn dims(&self) -> DimInfo {
        DimInfo::new(&[self.ewn, self.nsn]).expect("fixture grid is non-empty")
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.ewn * self.nsn
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Alias the geometry arrays, the shared `dimInfo` and model time into
    /// `reg`, and set the physical constants a core typically reads.
    pub fn attach(&mut self, reg: &mut Registry) -> Result<(), RegistryError> {
        reg.set_double_var(ptr(&mut self.thck), "thck", "geometry")?;
        reg.set_double_var(ptr(&mut self.usrf), "usrf", "geometry")?;
        reg.set_double_var(ptr(&mut self.topg), "topg", "geometry")?;
        let dim = ptr(&mut self.dim_info);
        for section in ["geometry", "velocity", "temper", "climate"] {
            reg.set_long_var(dim, "dimInfo", section)?;
        }
        reg.set_long_scalar(self.len() as i64, "dimInfo", "velocity_hom")?;
        reg.set_double_var(ptr(&mut self.time), "time", "numerics")?;
        reg.set_double_scalar(31_556_926.0, "seconds_per_year", "constants")?;
        reg.set_double_scalar(9.81, "gravity", "constants")?;
        reg.set_double_scalar(910.0, "rho_ice", "constants")?;
        reg.set_double_scalar(1028.0, "rho_seawater", "constants")?;
        Ok(())
    }
}

fn ptr<T>(buf: &mut [T]) -> NonNull<T> {
    NonNull::new(buf.as_mut_ptr()).expect("Vec pointers are never null")
}

/// Every lifecycle call a [`RecordingDyCore`] has seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallLog {
    pub init_paths: Vec<PathBuf>,
    /// `(time before, increment)` per successful `run`.
    pub runs: Vec<(f64, f64)>,
    pub deletes: usize,
}

/// Requires `geometry.thck`, then on each step copies a constant velocity
/// field into `velocity.uvel` and `velocity.vvel`.
///
/// The log is shared through `Rc` so a test can inspect it after the core
/// has been boxed into an instance.
pub struct RecordingDyCore {
    pub name: String,
    pub output_dims: DimInfo,
    pub speed: f64,
    log: Rc<RefCell<CallLog>>,
}

impl RecordingDyCore {
    pub fn new(name: impl Into<String>, output_dims: DimInfo, speed: f64) -> Self {
        Self {
            name: name.into(),
            output_dims,
            speed,
            log: Rc::new(RefCell::new(CallLog::default())),
        }
    }

    /// Handle to the shared call log.
    pub fn log(&self) -> Rc<RefCell<CallLog>> {
        Rc::clone(&self.log)
    }
}

impl DyCore for RecordingDyCore {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, vars: &mut Registry, config_path: &Path) -> Result<(), DyCoreError> {
        let thck = FieldKey::lookup(Section::Geometry, "thck").expect("catalog has thck");
        if !vars.is_set(thck) {
            return Err(DyCoreError::MissingInput { key: thck });
        }
        self.log.borrow_mut().init_paths.push(config_path.to_path_buf());
        Ok(())
    }

    fn run(
        &mut self,
        vars: &mut Registry,
        current_time: &mut f64,
        time_increment: f64,
    ) -> Result<(), DyCoreError> {
        let velocity = vec![self.speed; self.output_dims.element_count()];
        vars.copy_in_double_var(&velocity, "uvel", "velocity", &self.output_dims)?;
        vars.copy_in_double_var(&velocity, "vvel", "velocity", &self.output_dims)?;
        self.log.borrow_mut().runs.push((*current_time, time_increment));
        *current_time += time_increment;
        Ok(())
    }

    fn delete(&mut self, _vars: &mut Registry) -> Result<(), DyCoreError> {
        self.log.borrow_mut().deletes += 1;
        Ok(())
    }
}

/// Which hook a [`FailingDyCore`] fails in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    Init,
    /// Fail on `run` after this many successful steps.
    Run { succeed_count: usize },
    Delete,
}

/// Fails deterministically at a configured hook; succeeds everywhere else.
pub struct FailingDyCore {
    pub fail_at: FailAt,
    runs: usize,
}

impl FailingDyCore {
    pub fn new(fail_at: FailAt) -> Self {
        Self { fail_at, runs: 0 }
    }

    /// How many steps have succeeded.
    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl DyCore for FailingDyCore {
    fn name(&self) -> &str {
        "failing"
    }

    fn init(&mut self, _vars: &mut Registry, config_path: &Path) -> Result<(), DyCoreError> {
        if self.fail_at == FailAt::Init {
            return Err(DyCoreError::Config {
                path: config_path.to_path_buf(),
                reason: "deliberate failure".into(),
            });
        }
        Ok(())
    }

    fn run(
        &mut self,
        _vars: &mut Registry,
        current_time: &mut f64,
        time_increment: f64,
    ) -> Result<(), DyCoreError> {
        let start = *current_time;
        // Corrupt the time first so tests can see the instance discards it.
        *current_time = f64::NAN;
        if let FailAt::Run { succeed_count } = self.fail_at {
            if self.runs >= succeed_count {
                return Err(DyCoreError::StepFailed {
                    reason: format!("deliberate failure after {succeed_count} steps"),
                });
            }
        }
        self.runs += 1;
        *current_time = start + time_increment;
        Ok(())
    }

    fn delete(&mut self, _vars: &mut Registry) -> Result<(), DyCoreError> {
        if self.fail_at == FailAt::Delete {
            return Err(DyCoreError::StepFailed {
                reason: "deliberate delete failure".into(),
            });
        }
        Ok(())
    }
}
