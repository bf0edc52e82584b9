//! Bring-up sequencer
//!
//! Drives the system from reset to a running runtime:
//!
//! ```text
//! ColdStart -> ImageRelocation -> MemoryZeroing -> VectorInit
//!           -> SubsystemInit (steps in order) -> OsStart -> [init task]
//! ```
//!
//! Everything up to `OsStart` is single threaded. Relocation happens
//! strictly before bss zeroing, and zeroing strictly before any step or
//! constructor runs. A failing step halts the core.
//!
//! The log transport and the stage tracker both keep state in RAM that
//! relocation and zeroing overwrite, so neither is touched before
//! `VectorInit`. The early stages are reported in one go once bss is clean.

use core::ops::Range;

use sprout_hal::{BootStorage, VectorTable, WordMemory};

use super::relocate::{relocate, RelocationReport};
use super::stage::{BootEvent, BootStage, StageTracker, BOOT_STAGE};
use super::steps::{run_steps, BootFailure, InitStep, StepError};
use super::task::{Runtime, TaskEntry};
use super::zero::zero_region;
use crate::config::BootConfig;

/// Pseudo-step name reported when the init task cannot be created
pub const INIT_TASK_STEP: &str = "init_task";

/// Reset-time bring-up driver
pub struct Sequencer<'a, S: ?Sized, M, V> {
    config: BootConfig,
    storage: &'a S,
    memory: M,
    vectors: V,
    bss: Range<u32>,
    current: BootStage,
    tracker: &'static StageTracker,
}

impl<'a, S, M, V> Sequencer<'a, S, M, V>
where
    S: BootStorage + ?Sized,
    M: WordMemory,
    V: VectorTable,
{
    /// Sequencer publishing its progress to [`BOOT_STAGE`]
    pub fn new(
        config: BootConfig,
        storage: &'a S,
        memory: M,
        vectors: V,
        bss: Range<u32>,
    ) -> Self {
        Self::with_tracker(config, storage, memory, vectors, bss, &BOOT_STAGE)
    }

    /// Sequencer publishing its progress to `tracker`
    ///
    /// The tracker may live in the bss region, so it is only ever written,
    /// never read back.
    pub fn with_tracker(
        config: BootConfig,
        storage: &'a S,
        memory: M,
        vectors: V,
        bss: Range<u32>,
        tracker: &'static StageTracker,
    ) -> Self {
        Self {
            config,
            storage,
            memory,
            vectors,
            bss,
            current: BootStage::ColdStart,
            tracker,
        }
    }

    /// Current bring-up stage
    pub fn stage(&self) -> BootStage {
        self.current
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn vectors(&self) -> &V {
        &self.vectors
    }

    fn advance(&mut self, event: BootEvent) {
        self.current = self.current.transition(event);
        if !memory_settled(self.current) {
            return;
        }
        self.tracker.set(self.current);
        #[cfg(feature = "defmt")]
        defmt::info!("boot stage: {}", self.current);
    }

    /// Bring the system up to the point where the runtime can start
    ///
    /// On success the init task has been created and the sequencer is in
    /// [`BootStage::OsStart`]. The first failing step is returned and no
    /// later step runs.
    pub fn bring_up<F, R>(
        &mut self,
        steps: &mut [InitStep<F>],
        runtime: &mut R,
        entry: TaskEntry,
        arg: usize,
    ) -> Result<R::Handle, BootFailure>
    where
        F: FnMut() -> Result<(), StepError>,
        R: Runtime,
    {
        self.advance(BootEvent::StageComplete);
        let report = relocate(self.storage, self.config.app_offset, &mut self.memory);

        self.advance(BootEvent::StageComplete);
        let words = zero_region(&mut self.memory, self.bss.clone());
        log_early_stages(&report, words);

        self.advance(BootEvent::StageComplete);
        self.vectors.install(self.config.vector_base);

        self.advance(BootEvent::StageComplete);
        if let Err(failure) = run_steps(steps) {
            self.advance(BootEvent::StepFailed);
            return Err(failure);
        }

        self.advance(BootEvent::StageComplete);
        let task = &self.config.init_task;
        let priority = task.priority.unwrap_or_else(|| runtime.max_priority());
        runtime
            .create_task(entry, task.name.as_str(), task.stack_words, arg, priority)
            .map_err(|err| BootFailure {
                step: INIT_TASK_STEP,
                error: err.into(),
            })
    }

    /// Bring the system up and start the runtime; never returns
    pub fn run<F, R>(
        mut self,
        steps: &mut [InitStep<F>],
        mut runtime: R,
        entry: TaskEntry,
        arg: usize,
    ) -> !
    where
        F: FnMut() -> Result<(), StepError>,
        R: Runtime,
    {
        match self.bring_up(steps, &mut runtime, entry, arg) {
            Ok(_) => runtime.start(),
            Err(failure) => halt(failure),
        }
    }
}

/// Whether relocation and bss zeroing are behind `stage`
fn memory_settled(stage: BootStage) -> bool {
    !matches!(
        stage,
        BootStage::ColdStart | BootStage::ImageRelocation | BootStage::MemoryZeroing
    )
}

/// Report the stages that ran before logging was safe
#[cfg(feature = "defmt")]
fn log_early_stages(report: &RelocationReport, zeroed_words: u32) {
    defmt::info!(
        "boot stage: {} -> {} -> {}",
        BootStage::ColdStart,
        BootStage::ImageRelocation,
        BootStage::MemoryZeroing
    );
    for segment in &report.segments {
        defmt::debug!(
            "segment: {=u32:#x} len {=u32}",
            segment.load_addr,
            segment.data_len
        );
    }
    defmt::info!("relocated {} words", report.words);
    defmt::debug!("bss: {} words zeroed", zeroed_words);
}

#[cfg(not(feature = "defmt"))]
fn log_early_stages(_report: &RelocationReport, _zeroed_words: u32) {}

/// Stop on a fatal bring-up failure
///
/// Goes through the panic handler, which parks the core until an
/// external reset.
pub fn halt(failure: BootFailure) -> ! {
    panic!("boot failed at {}: {:?}", failure.step, failure.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot::task::SpawnError;
    use core::cell::RefCell;
    use sprout_hal::sim::SimMemory;
    use sprout_image::segment::write_image;
    use sprout_image::ImageHeader;

    const RAM_BASE: u32 = 0x3FFE_8000;
    const APP_OFFSET: u32 = 0x100;
    const BSS: Range<u32> = (RAM_BASE + 0x40)..(RAM_BASE + 0x60);

    const IROM: &[u8] = &[0xEE; 8];
    const TEXT: &[u8] = &[0x11; 16];
    const DATA: &[u8] = &[0x22; 32];
    const RODATA: &[u8] = &[0x33; 8];

    #[derive(Default)]
    struct RecordingVectors {
        installed: Vec<u32>,
    }

    impl VectorTable for RecordingVectors {
        fn install(&mut self, base: u32) {
            self.installed.push(base);
        }
    }

    struct SharedVectors<'a>(&'a RefCell<Vec<u32>>);

    impl VectorTable for SharedVectors<'_> {
        fn install(&mut self, base: u32) {
            self.0.borrow_mut().push(base);
        }
    }

    #[derive(Debug, PartialEq)]
    struct Spawned {
        name: String,
        stack_words: u32,
        arg: usize,
        priority: u8,
    }

    struct MockRuntime {
        max: u8,
        result: Result<(), SpawnError>,
        spawned: Vec<Spawned>,
    }

    impl MockRuntime {
        fn new() -> Self {
            Self {
                max: 24,
                result: Ok(()),
                spawned: Vec::new(),
            }
        }
    }

    impl Runtime for MockRuntime {
        type Handle = usize;

        fn max_priority(&self) -> u8 {
            self.max
        }

        fn create_task(
            &mut self,
            _entry: TaskEntry,
            name: &str,
            stack_words: u32,
            arg: usize,
            priority: u8,
        ) -> Result<usize, SpawnError> {
            self.result?;
            self.spawned.push(Spawned {
                name: name.into(),
                stack_words,
                arg,
                priority,
            });
            Ok(self.spawned.len())
        }

        fn start(self) -> ! {
            unreachable!("tests never start the runtime")
        }
    }

    fn task_entry(_arg: usize) {}

    fn flash_image() -> [u8; 0x200] {
        let mut flash = [0xFFu8; 0x200];
        write_image(
            ImageHeader::new(4, 0x4010_0004),
            &[
                (0x4020_1010, IROM),
                (RAM_BASE, TEXT),
                // Initial contents the bss zeroing must overwrite
                (RAM_BASE + 0x40, DATA),
                (RAM_BASE + 0x80, RODATA),
            ],
            &mut flash[APP_OFFSET as usize..],
        )
        .unwrap();
        flash
    }

    fn config() -> BootConfig {
        BootConfig {
            app_offset: APP_OFFSET,
            ..BootConfig::default()
        }
    }

    type Log = RefCell<Vec<usize>>;

    fn step<'a>(
        log: &'a Log,
        id: usize,
        fails: bool,
    ) -> impl FnMut() -> Result<(), StepError> + 'a {
        move || {
            log.borrow_mut().push(id);
            if fails {
                Err(StepError(-7))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_bring_up_success() {
        static STAGE: StageTracker = StageTracker::new();
        let flash = flash_image();
        let log = Log::default();
        let mut steps = [
            InitStep::new("rtc", step(&log, 1, false)),
            InitStep::new("mac", step(&log, 2, false)),
        ];
        let mut runtime = MockRuntime::new();

        let mut seq = Sequencer::with_tracker(
            config(),
            &flash[..],
            SimMemory::<64>::new(RAM_BASE, 0),
            RecordingVectors::default(),
            BSS,
            &STAGE,
        );
        assert_eq!(seq.stage(), BootStage::ColdStart);

        let handle = seq.bring_up(&mut steps, &mut runtime, task_entry, 0x55);
        assert_eq!(handle, Ok(1));
        assert_eq!(seq.stage(), BootStage::OsStart);
        assert_eq!(STAGE.get(), BootStage::OsStart);
        assert_eq!(*log.borrow(), vec![1, 2]);

        assert_eq!(seq.memory().read_word(RAM_BASE), 0x1111_1111);
        assert_eq!(seq.memory().read_word(RAM_BASE + 0x80), 0x3333_3333);
        assert_eq!(seq.vectors().installed, vec![0x4010_0000]);

        assert_eq!(
            runtime.spawned,
            vec![Spawned {
                name: "uiT".into(),
                stack_words: 512,
                arg: 0x55,
                priority: 24,
            }]
        );
    }

    /// Memory that records the published stage on every write
    struct StageWatch<'t> {
        inner: SimMemory<64>,
        tracker: &'t StageTracker,
        seen: Vec<BootStage>,
    }

    impl WordMemory for StageWatch<'_> {
        fn read_word(&self, addr: u32) -> u32 {
            self.inner.read_word(addr)
        }

        fn write_word(&mut self, addr: u32, value: u32) {
            self.seen.push(self.tracker.get());
            self.inner.write_word(addr, value);
        }
    }

    #[test]
    fn test_tracker_untouched_until_memory_settled() {
        static STAGE: StageTracker = StageTracker::new();
        let flash = flash_image();
        let mut runtime = MockRuntime::new();
        let mut seq = Sequencer::with_tracker(
            config(),
            &flash[..],
            StageWatch {
                inner: SimMemory::new(RAM_BASE, 0),
                tracker: &STAGE,
                seen: Vec::new(),
            },
            RecordingVectors::default(),
            BSS,
            &STAGE,
        );

        let mut steps = [InitStep::new("check", || {
            // First published stage is visible to the steps
            assert_eq!(STAGE.get(), BootStage::SubsystemInit);
            Ok(())
        })];
        seq.bring_up(&mut steps, &mut runtime, task_entry, 0).unwrap();

        // Relocated words plus the zeroed bss words
        let seen = &seq.memory().seen;
        assert_eq!(seen.len(), (4 + 8 + 2) + 8);
        assert!(seen.iter().all(|stage| *stage == BootStage::ColdStart));
        assert_eq!(STAGE.get(), BootStage::OsStart);
    }

    #[test]
    fn test_vectors_installed_before_steps() {
        static STAGE: StageTracker = StageTracker::new();
        let flash = flash_image();
        let mut runtime = MockRuntime::new();
        let installed = RefCell::new(Vec::new());
        let mut seq = Sequencer::with_tracker(
            config(),
            &flash[..],
            SimMemory::<64>::new(RAM_BASE, 0),
            SharedVectors(&installed),
            BSS,
            &STAGE,
        );

        let mut steps = [InitStep::new("gpio", || {
            // Interrupt attach needs the vector base in place
            assert_eq!(*installed.borrow(), vec![0x4010_0000]);
            Ok(())
        })];
        seq.bring_up(&mut steps, &mut runtime, task_entry, 0).unwrap();
    }

    #[test]
    fn test_zeroing_runs_after_relocation() {
        static STAGE: StageTracker = StageTracker::new();
        let flash = flash_image();
        let mut steps: [InitStep; 0] = [];
        let mut runtime = MockRuntime::new();
        let mut seq = Sequencer::with_tracker(
            config(),
            &flash[..],
            SimMemory::<64>::new(RAM_BASE, 0xA5A5_A5A5),
            RecordingVectors::default(),
            BSS,
            &STAGE,
        );

        seq.bring_up(&mut steps, &mut runtime, task_entry, 0).unwrap();

        // The segment loaded over the bss region was zeroed afterwards
        for addr in BSS.step_by(4) {
            assert_eq!(seq.memory().read_word(addr), 0);
        }
        assert_eq!(seq.memory().read_word(RAM_BASE + 0x60), 0xA5A5_A5A5);
    }

    #[test]
    fn test_step_failure_halts_remaining_steps() {
        static STAGE: StageTracker = StageTracker::new();
        let flash = flash_image();
        let log = Log::default();
        let mut steps = [
            InitStep::new("s1", step(&log, 1, false)),
            InitStep::new("s2", step(&log, 2, false)),
            InitStep::new("s3", step(&log, 3, true)),
            InitStep::new("s4", step(&log, 4, false)),
            InitStep::new("s5", step(&log, 5, false)),
            InitStep::new("s6", step(&log, 6, false)),
            InitStep::new("s7", step(&log, 7, false)),
        ];
        let mut runtime = MockRuntime::new();
        let mut seq = Sequencer::with_tracker(
            config(),
            &flash[..],
            SimMemory::<64>::new(RAM_BASE, 0),
            RecordingVectors::default(),
            BSS,
            &STAGE,
        );

        let failure = seq.bring_up(&mut steps, &mut runtime, task_entry, 0);
        assert_eq!(
            failure,
            Err(BootFailure {
                step: "s3",
                error: StepError(-7)
            })
        );
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert_eq!(seq.stage(), BootStage::BootFailure);
        assert_eq!(STAGE.get(), BootStage::BootFailure);
        assert!(runtime.spawned.is_empty());
    }

    #[test]
    fn test_configured_priority_and_spawn_failure() {
        static STAGE: StageTracker = StageTracker::new();
        let flash = flash_image();
        let mut cfg = config();
        cfg.init_task.priority = Some(3);

        let mut steps: [InitStep; 0] = [];
        let mut runtime = MockRuntime::new();
        let mut seq = Sequencer::with_tracker(
            cfg.clone(),
            &flash[..],
            SimMemory::<64>::new(RAM_BASE, 0),
            RecordingVectors::default(),
            BSS,
            &STAGE,
        );
        seq.bring_up(&mut steps, &mut runtime, task_entry, 0).unwrap();
        assert_eq!(runtime.spawned[0].priority, 3);

        let mut runtime = MockRuntime::new();
        runtime.result = Err(SpawnError::OutOfMemory);
        let mut seq = Sequencer::with_tracker(
            cfg,
            &flash[..],
            SimMemory::<64>::new(RAM_BASE, 0),
            RecordingVectors::default(),
            BSS,
            &STAGE,
        );
        assert_eq!(
            seq.bring_up(&mut steps, &mut runtime, task_entry, 0),
            Err(BootFailure {
                step: INIT_TASK_STEP,
                error: StepError(-1)
            })
        );
        // Only subsystem init can enter the failure stage
        assert_eq!(seq.stage(), BootStage::OsStart);
    }

    #[test]
    #[should_panic(expected = "boot failed at wifi_nvs")]
    fn test_halt_panics() {
        halt(BootFailure {
            step: "wifi_nvs",
            error: StepError(-3),
        });
    }
}
