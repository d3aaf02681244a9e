use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::path::Path;

use mockall::mock;
use vcosim_core::common::{OracleFault, Trap};
use vcosim_core::core::{TrackedEvent, VectorCsrs};
use vcosim_core::oracle::{CommitLog, Oracle, ReferenceModel};

mock! {
    pub Oracle {}
    impl Oracle for Oracle {
        fn reset(&mut self);
        fn load_image(&mut self, path: &Path, entry: u64) -> io::Result<()>;
        fn step(&mut self) -> Result<Option<TrackedEvent>, OracleFault>;
    }
}

impl std::fmt::Debug for MockOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockOracle").finish_non_exhaustive()
    }
}

/// Oracle mock that yields `script` in order, then traps.
///
/// Scripts end with an exit marker, so the trap only fires when a run overshoots it.
pub fn scripted_oracle(script: Vec<Option<TrackedEvent>>) -> MockOracle {
    let mut script: VecDeque<_> = script.into();
    let mut oracle = MockOracle::new();
    let _ = oracle.expect_reset().times(1).return_const(());
    let _ = oracle
        .expect_load_image()
        .times(1)
        .returning(|_, _| Ok(()));
    let _ = oracle.expect_step().returning(move || match script.pop_front() {
        Some(event) => Ok(event),
        None => Err(OracleFault::new(0xdead, Trap::Other(24))),
    });
    oracle
}

/// Effects of one instruction of a `ScriptedModel` program.
#[derive(Debug, Clone, Default)]
pub struct Effect {
    /// Register-file bytes written, as `(index, byte)`.
    pub vrf_writes: Vec<(usize, u8)>,
    /// Reported commit log.
    pub log: CommitLog,
    /// Trap raised instead of executing.
    pub trap: Option<Trap>,
}

/// Reference model replaying a fixed program.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    pub program: BTreeMap<u64, (u32, Effect)>,
    pub pc: u64,
    pub xregs: [u64; 32],
    pub csrs: VectorCsrs,
    pub vrf: Vec<u8>,
    pub executed: Vec<u32>,
    pub resets: u32,
}

impl ScriptedModel {
    pub fn new(vrf_bytes: usize) -> Self {
        Self {
            vrf: vec![0; vrf_bytes],
            ..Self::default()
        }
    }

    /// Places `inst` at `pc` with `effect`.
    pub fn with_insn(mut self, pc: u64, inst: u32, effect: Effect) -> Self {
        let _ = self.program.insert(pc, (inst, effect));
        self
    }
}

impl ReferenceModel for ScriptedModel {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn load_image(&mut self, _path: &Path, entry: u64) -> io::Result<()> {
        self.pc = entry;
        Ok(())
    }

    fn pc(&self) -> u64 {
        self.pc
    }

    fn fetch(&mut self) -> Result<u32, Trap> {
        self.program
            .get(&self.pc)
            .map(|(inst, _)| *inst)
            .ok_or(Trap::InstructionAccessFault(self.pc))
    }

    fn xreg(&self, index: u32) -> u64 {
        self.xregs[index as usize]
    }

    fn vector_csrs(&self) -> VectorCsrs {
        self.csrs
    }

    fn vrf(&self) -> &[u8] {
        &self.vrf
    }

    fn execute(&mut self, inst: u32) -> Result<CommitLog, Trap> {
        let (_, effect) = self
            .program
            .get(&self.pc)
            .cloned()
            .ok_or(Trap::InstructionAccessFault(self.pc))?;
        if let Some(trap) = effect.trap {
            return Err(trap);
        }
        for &(index, byte) in &effect.vrf_writes {
            self.vrf[index] = byte;
        }
        if let Some((rd, value)) = effect.log.xreg_write {
            if rd != 0 {
                self.xregs[rd as usize] = value;
            }
        }
        self.executed.push(inst);
        self.pc += 4;
        Ok(effect.log)
    }
}
