//! Ordered subsystem initialization
//!
//! Subsystems are brought up by a fixed list of named steps. Order is
//! load-bearing (later steps rely on state set up by earlier ones), so
//! steps run exactly in list order, once each, and the first failure ends
//! the run. There is no retry and no partial continuation.

/// Failure reported by a subsystem init step
///
/// Carries the raw status code of the subsystem's init call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepError(pub i32);

impl StepError {
    /// Map a C-style status (0 = success) to a step result
    pub fn check(status: i32) -> Result<(), StepError> {
        if status == 0 {
            Ok(())
        } else {
            Err(StepError(status))
        }
    }
}

/// The step that stopped bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootFailure {
    /// Name of the failing step
    pub step: &'static str,
    /// What it reported
    pub error: StepError,
}

/// Plain subsystem init function
pub type StepFn = fn() -> Result<(), StepError>;

/// One named subsystem init step
pub struct InitStep<F = StepFn> {
    pub name: &'static str,
    init: F,
}

impl<F> InitStep<F>
where
    F: FnMut() -> Result<(), StepError>,
{
    pub const fn new(name: &'static str, init: F) -> Self {
        Self { name, init }
    }

    /// Run the step once
    pub fn run(&mut self) -> Result<(), StepError> {
        (self.init)()
    }
}

/// Run `steps` in order, stopping at the first failure
///
/// Returns the number of steps that completed.
pub fn run_steps<F>(steps: &mut [InitStep<F>]) -> Result<usize, BootFailure>
where
    F: FnMut() -> Result<(), StepError>,
{
    for step in steps.iter_mut() {
        #[cfg(feature = "defmt")]
        defmt::debug!("init step: {}", step.name);

        if let Err(error) = step.run() {
            #[cfg(feature = "defmt")]
            defmt::error!("init step {} failed: {}", step.name, error);
            return Err(BootFailure {
                step: step.name,
                error,
            });
        }
    }
    Ok(steps.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    type Log = RefCell<heapless::Vec<u8, 16>>;

    fn recording<'a>(
        log: &'a Log,
        id: u8,
        fails: bool,
    ) -> impl FnMut() -> Result<(), StepError> + 'a {
        move || {
            log.borrow_mut().push(id).unwrap();
            if fails {
                Err(StepError(-(id as i32)))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_all_steps_run_in_order() {
        let log = Log::default();
        let mut steps = [
            InitStep::new("rtc", recording(&log, 1, false)),
            InitStep::new("mac", recording(&log, 2, false)),
            InitStep::new("gpio", recording(&log, 3, false)),
        ];
        assert_eq!(run_steps(&mut steps), Ok(3));
        assert_eq!(&log.borrow()[..], &[1, 2, 3]);
    }

    #[test]
    fn test_first_failure_stops_the_run() {
        let log = Log::default();
        let mut steps = [
            InitStep::new("s1", recording(&log, 1, false)),
            InitStep::new("s2", recording(&log, 2, false)),
            InitStep::new("s3", recording(&log, 3, true)),
            InitStep::new("s4", recording(&log, 4, false)),
            InitStep::new("s5", recording(&log, 5, true)),
            InitStep::new("s6", recording(&log, 6, false)),
            InitStep::new("s7", recording(&log, 7, false)),
        ];

        let failure = run_steps(&mut steps).unwrap_err();
        assert_eq!(failure.step, "s3");
        assert_eq!(failure.error, StepError(-3));
        // Steps 4..7 never invoked
        assert_eq!(&log.borrow()[..], &[1, 2, 3]);
    }

    #[test]
    fn test_empty_list_succeeds() {
        let mut steps: [InitStep; 0] = [];
        assert_eq!(run_steps(&mut steps), Ok(0));
    }

    #[test]
    fn test_fn_pointer_steps() {
        fn ok() -> Result<(), StepError> {
            StepError::check(0)
        }
        fn broken() -> Result<(), StepError> {
            StepError::check(-1)
        }

        let mut steps: [InitStep; 2] = [
            InitStep::new("ok", ok as StepFn),
            InitStep::new("broken", broken as StepFn),
        ];
        assert_eq!(
            run_steps(&mut steps),
            Err(BootFailure {
                step: "broken",
                error: StepError(-1)
            })
        );
    }
}
