/*
 * Test utilities and fakes for oxp-core
 *
 * An in-memory EC that counts transactions and a platform lock whose
 * behaviour can be scripted per test.
 */

use std::sync::Arc;
use std::time::Duration;

use oxp_error::{OxpError, Result};
use parking_lot::Mutex;

use crate::board::{identify, BoardProfile, CpuVendor};
use crate::hw::{EcBus, HardwareMutex, RegisterTransport, Token};
use crate::sensors::DeviceSession;
use crate::settings::FanFlags;

#[derive(Debug)]
struct FakeEcState {
    registers: [u8; 256],
    reads: usize,
    writes: Vec<(u8, u8)>,
    failing: Vec<u8>,
}

/// In-memory EC. Clones share the same register file.
#[derive(Debug, Clone)]
pub struct FakeEc {
    state: Arc<Mutex<FakeEcState>>,
}

impl FakeEc {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeEcState {
                registers: [0; 256],
                reads: 0,
                writes: Vec::new(),
                failing: Vec::new(),
            })),
        }
    }

    pub fn set(&self, register: u8, value: u8) {
        self.state.lock().registers[register as usize] = value;
    }

    pub fn get(&self, register: u8) -> u8 {
        self.state.lock().registers[register as usize]
    }

    /// Make every transaction on `register` fail
    pub fn fail_on(&self, register: u8) {
        self.state.lock().failing.push(register);
    }

    pub fn reads(&self) -> usize {
        self.state.lock().reads
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state.lock().writes.clone()
    }
}

impl EcBus for FakeEc {
    fn read_byte(&self, register: u8) -> Result<u8> {
        let mut state = self.state.lock();
        state.reads += 1;
        if state.failing.contains(&register) {
            return Err(OxpError::ec(register, "injected read failure"));
        }
        Ok(state.registers[register as usize])
    }

    fn write_byte(&self, register: u8, value: u8) -> Result<()> {
        let mut state = self.state.lock();
        if state.failing.contains(&register) {
            return Err(OxpError::ec(register, "injected write failure"));
        }
        state.registers[register as usize] = value;
        state.writes.push((register, value));
        Ok(())
    }
}

/// How the scripted lock answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockScript {
    Grant,
    Timeout,
    FailRelease,
}

#[derive(Debug)]
struct ScriptedMutexState {
    script: LockScript,
    acquires: usize,
    releases: usize,
    next: u32,
}

/// Platform lock double. Clones share counters.
#[derive(Debug, Clone)]
pub struct ScriptedMutex {
    state: Arc<Mutex<ScriptedMutexState>>,
}

impl ScriptedMutex {
    pub fn new(script: LockScript) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedMutexState {
                script,
                acquires: 0,
                releases: 0,
                next: 1,
            })),
        }
    }

    pub fn acquires(&self) -> usize {
        self.state.lock().acquires
    }

    pub fn releases(&self) -> usize {
        self.state.lock().releases
    }
}

impl HardwareMutex for ScriptedMutex {
    fn acquire(&self, timeout: Duration) -> Result<Token> {
        let mut state = self.state.lock();
        if state.script == LockScript::Timeout {
            return Err(OxpError::Busy {
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        state.acquires += 1;
        state.next += 1;
        Ok(Token::new(state.next))
    }

    fn release(&self, _token: Token) -> Result<()> {
        let mut state = self.state.lock();
        state.releases += 1;
        match state.script {
            LockScript::FailRelease => Err(OxpError::MutexRelease("scripted failure".into())),
            _ => Ok(()),
        }
    }
}

pub fn amd_profile() -> BoardProfile {
    identify("ONE-NETBOOK", "ONE XPLAYER", CpuVendor::Amd).unwrap()
}

pub fn intel_profile() -> BoardProfile {
    identify("ONE-NETBOOK", "ONE XPLAYER", CpuVendor::Intel).unwrap()
}

/// Session over fakes, returning handles to inspect them afterwards
pub fn session(
    profile: BoardProfile,
    script: LockScript,
    fan_control: bool,
    fan_input_intel: bool,
) -> (DeviceSession<FakeEc, ScriptedMutex>, FakeEc, ScriptedMutex) {
    let ec = FakeEc::new();
    let mutex = ScriptedMutex::new(script);
    let transport = RegisterTransport::new(ec.clone(), mutex.clone());
    let flags = Arc::new(FanFlags::new(fan_control, fan_input_intel));
    (DeviceSession::new(profile, transport, flags), ec, mutex)
}
