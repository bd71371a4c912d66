//! # Console Tests
//!
//! Command parsing, inspection output, stepping commands and error recovery.

use crate::common::harness::{RAM_BASE, TestContext, small_config};
use crate::common::mocks::hart::RecordingHart;
use crate::common::mocks::host::{EchoHost, Seen};
use hartsim_core::common::{BusError, SimError};
use hartsim_core::isa::abi::REG_A0;
use hartsim_core::sim::interactive::{Condition, FloatWidth, PollMode};
use hartsim_core::sim::{Command, CommandError};
use hartsim_core::soc::devices::Htif;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::{Arc, Mutex};

#[rstest]
#[case::empty("", Command::Run { count: Some(1), noisy: true })]
#[case::blank("   ", Command::Run { count: Some(1), noisy: true })]
#[case::run_forever("run", Command::Run { count: None, noisy: true })]
#[case::run_short("r 10", Command::Run { count: Some(10), noisy: true })]
#[case::silent("rs 25", Command::Run { count: Some(25), noisy: false })]
#[case::run_proc("run_proc 1 5", Command::RunProc { proc: 1, count: Some(5), noisy: true })]
#[case::rs_proc("rs_proc 0", Command::RunProc { proc: 0, count: None, noisy: false })]
#[case::reg_abi("reg 0 a0", Command::Reg { proc: 0, reg: 10 })]
#[case::reg_numeric("reg 2 x31", Command::Reg { proc: 2, reg: 31 })]
#[case::fregs("fregs 1 ft3", Command::Freg { proc: 1, reg: 3, width: FloatWidth::Single })]
#[case::fregd("fregd 0 fa1", Command::Freg { proc: 0, reg: 11, width: FloatWidth::Double })]
#[case::pc("pc 3", Command::Pc { proc: 3 })]
#[case::mem_prefixed("mem 0x80000000", Command::Mem { addr: 0x8000_0000 })]
#[case::mem_bare("mem 80000008", Command::Mem { addr: 0x8000_0008 })]
#[case::str("str 80001000", Command::Str { addr: 0x8000_1000 })]
#[case::until_pc(
    "until pc 0 80000010",
    Command::Until { condition: Condition::Pc { proc: 0 }, value: 0x8000_0010, mode: PollMode::Until, interval: None }
)]
#[case::until_reg(
    "until reg 1 a0 c",
    Command::Until { condition: Condition::Reg { proc: 1, reg: 10 }, value: 12, mode: PollMode::Until, interval: None }
)]
#[case::while_mem(
    "while mem 0x80000100 0",
    Command::Until { condition: Condition::Mem { addr: 0x8000_0100 }, value: 0, mode: PollMode::While, interval: None }
)]
#[case::while_tohost(
    "while tohost 0",
    Command::Until { condition: Condition::ToHost, value: 0, mode: PollMode::While, interval: None }
)]
#[case::until_pc_interval(
    "until pc 0 80000010 4",
    Command::Until { condition: Condition::Pc { proc: 0 }, value: 0x8000_0010, mode: PollMode::Until, interval: Some(4) }
)]
#[case::while_tohost_interval(
    "while tohost 0 100",
    Command::Until { condition: Condition::ToHost, value: 0, mode: PollMode::While, interval: Some(100) }
)]
#[case::quit("quit", Command::Quit)]
#[case::q("q", Command::Quit)]
#[case::help("help", Command::Help)]
fn test_parse(#[case] line: &str, #[case] expected: Command) {
    assert_eq!(Command::parse(line), Ok(expected));
}

#[rstest]
#[case::unknown("frobnicate", CommandError::Unknown("frobnicate".into()))]
#[case::bad_count("rs ten", CommandError::InvalidNumber("ten".into()))]
#[case::bad_proc("pc x", CommandError::InvalidNumber("x".into()))]
#[case::bad_addr("mem 0xzz", CommandError::InvalidNumber("0xzz".into()))]
#[case::bad_reg("reg 0 q9", CommandError::UnknownRegister("q9".into()))]
#[case::bad_freg("fregd 0 a0", CommandError::UnknownRegister("a0".into()))]
#[case::zero_interval("until pc 0 80000010 0", CommandError::ZeroInterval)]
#[case::hex_interval("until tohost 0 0x10", CommandError::InvalidNumber("0x10".into()))]
fn test_parse_rejects(#[case] line: &str, #[case] expected: CommandError) {
    assert_eq!(Command::parse(line), Err(expected));
}

#[rstest]
#[case("reg 0")]
#[case("pc")]
#[case("mem")]
#[case("run 1 2")]
#[case("quit now")]
#[case("until pc 0")]
#[case("until tohost")]
#[case("while reg 0 a0")]
#[case("until sp 0 1")]
#[case("until pc 0 1 2 3")]
fn test_parse_usage_errors(#[case] line: &str) {
    assert!(matches!(Command::parse(line), Err(CommandError::Usage(_))));
}

#[test]
fn test_empty_line_steps_every_hart_once_noisily() {
    let mut ctx = TestContext::new(2);
    let _ = ctx.console("\nq\n");
    assert_eq!(ctx.steps(), vec![(0, 1), (1, 1)]);
    assert!(!ctx.sim.is_running());
}

#[test]
fn test_inspect_registers_and_pc() {
    let mut ctx = TestContext::build(|log| {
        vec![
            RecordingHart::new(0, log).with_xreg(2, 0x8000_fff0),
            RecordingHart::new(1, log),
        ]
    });
    let out = ctx.console("rs 8\nreg 0 a0\nreg 0 sp\nreg 0 zero\npc 1\nq\n");
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        vec![
            "0x0000000000000008",
            "0x000000008000fff0",
            "0x0000000000000000",
            "0x0000000080000020",
        ]
    );
}

#[test]
fn test_inspect_float_registers() {
    let mut ctx = TestContext::build(|log| {
        vec![
            RecordingHart::new(0, log)
                .with_freg(10, 1.5f64.to_bits())
                .with_freg(3, u64::from(2.5f32.to_bits())),
        ]
    });
    let out = ctx.console("fregd 0 fa0\nfregs 0 ft3\nq\n");
    assert_eq!(out.lines().collect::<Vec<_>>(), vec!["1.5", "2.5"]);
}

#[test]
fn test_inspect_memory_and_strings() {
    let mut ctx = TestContext::new(1);
    ctx.sim
        .system_mut()
        .write_u64(RAM_BASE + 0x10, 0x1122_3344_5566_7788)
        .unwrap();
    ctx.sim
        .system_mut()
        .load_binary_at(b"hart says hi\0", RAM_BASE + 0x200)
        .unwrap();
    let out = ctx.console("mem 80000010\nmem 0x80000014\nstr 80000200\nq\n");
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        vec!["0x1122334455667788", "0x0000000011223344", "hart says hi"]
    );
}

#[test]
fn test_malformed_input_keeps_the_loop_alive() {
    let mut ctx = TestContext::new(2);
    let out = ctx.console("bogus\nreg 5 a0\nmem 10000000\nrs 1\nq\n");
    let errors: Vec<_> = out.lines().filter(|l| l.starts_with("error: ")).collect();
    assert_eq!(
        errors,
        vec![
            "error: unknown command `bogus` (try `help`)".to_string(),
            "error: no processor 5 (2 registered)".to_string(),
            format!(
                "error: {}",
                BusError::Unmapped {
                    addr: 0x1000_0000,
                    len: 8
                }
            ),
        ]
    );
    assert_eq!(ctx.steps(), vec![(0, 1), (1, 1)]);
    assert!(!ctx.sim.is_running());
}

#[test]
fn test_run_proc_with_bad_index_is_reported() {
    let mut ctx = TestContext::new(1);
    let out = ctx.console("rs_proc 4 1\nq\n");
    assert_eq!(out, "error: no processor 4 (1 registered)\n");
    assert!(ctx.steps().is_empty());
}

#[test]
fn test_end_of_input_stops_the_simulator() {
    let mut ctx = TestContext::new(1);
    let _ = ctx.console("rs 4\n");
    assert!(!ctx.sim.is_running());
    assert_eq!(ctx.steps(), vec![(0, 1), (0, 1), (0, 1), (0, 1)]);
}

#[test]
fn test_prompt_printed_before_each_command() {
    let mut config = small_config();
    config.console.prompt = "(hs) ".into();
    let mut ctx = TestContext::build_with(config, Box::new(Htif::new()), |log| {
        vec![RecordingHart::new(0, log)]
    });
    let out = ctx.console("pc 0\nq\n");
    assert_eq!(out, "(hs) 0x0000000080000000\n(hs) ");
}

#[test]
fn test_help_lists_commands() {
    let mut ctx = TestContext::new(1);
    let out = ctx.console("help\nq\n");
    assert!(out.starts_with("commands:"));
    assert!(out.contains("until|while"));
}

#[test]
fn test_run_proc_steps_a_single_hart() {
    let mut ctx = TestContext::new(2);
    let _ = ctx.console("run_proc 1 3\nq\n");
    assert_eq!(ctx.steps(), vec![(1, 3)]);
}

#[test]
fn test_run_forever_ends_on_host_exit() {
    let mut ctx = TestContext::build(|log| {
        vec![
            RecordingHart::new(0, log).posting_tohost(8, 1),
            RecordingHart::new(1, log),
        ]
    });
    let (result, _) = ctx.try_console("run\n");
    result.unwrap();
    assert_eq!(ctx.sim.exit_code(), Some(0));
    assert_eq!(ctx.sim.stats().instructions, vec![8, 8]);
}

#[test]
fn test_run_proc_forever_ends_on_host_exit() {
    let mut ctx = TestContext::build(|log| {
        vec![
            RecordingHart::new(0, log).posting_tohost(8, 1),
            RecordingHart::new(1, log),
        ]
    });
    let _ = ctx.console("rs_proc 0\n");
    assert_eq!(ctx.sim.exit_code(), Some(0));
    assert_eq!(ctx.sim.stats().instructions, vec![8, 0]);
}

#[test]
fn test_until_register_matches() {
    let mut ctx = TestContext::new(2);
    let _ = ctx.console("until reg 0 a0 c\nq\n");
    assert_eq!(ctx.sim.hart(0).unwrap().read_xreg(REG_A0), 12);
    assert_eq!(ctx.sim.hart(1).unwrap().read_xreg(REG_A0), 12);
}

#[test]
fn test_until_condition_already_true_does_not_step() {
    let mut ctx = TestContext::new(1);
    let _ = ctx.console("until pc 0 80000000\nq\n");
    assert!(ctx.steps().is_empty());
}

#[test]
fn test_while_pc_steps_until_it_moves() {
    let mut ctx = TestContext::new(1);
    let _ = ctx.console("while pc 0 0x80000000\nq\n");
    assert_eq!(ctx.steps(), vec![(0, 1)]);
}

#[test]
fn test_until_memory_matches() {
    let mut ctx =
        TestContext::build(|log| vec![RecordingHart::new(0, log).mirroring_to(RAM_BASE + 0x100)]);
    let _ = ctx.console("until mem 80000100 5\nq\n");
    assert_eq!(ctx.sim.system_mut().read_u64(RAM_BASE + 0x100).unwrap(), 5);
}

#[test]
fn test_until_tohost_matches_latest_value() {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let mut ctx = TestContext::build_with(small_config(), Box::new(EchoHost::new(&seen)), |log| {
        vec![
            RecordingHart::new(0, log).posting_tohost(3, 0x2a),
            RecordingHart::new(1, log),
        ]
    });
    let _ = ctx.console("until tohost 2a\nq\n");
    assert_eq!(ctx.sim.hart(0).unwrap().read_xreg(REG_A0), 3);
}

#[test]
fn test_poll_interval_sets_step_granularity() {
    let mut config = small_config();
    config.console.poll_interval = 4;
    let mut ctx = TestContext::build_with(config, Box::new(Htif::new()), |log| {
        vec![RecordingHart::new(0, log)]
    });
    let _ = ctx.console("until reg 0 a0 8\nq\n");
    assert_eq!(ctx.steps(), vec![(0, 4), (0, 4)]);
}

#[test]
fn test_interval_argument_overrides_poll_interval() {
    let mut ctx = TestContext::build(|log| vec![RecordingHart::new(0, log)]);
    assert_eq!(ctx.sim.config().console.poll_interval, 1);
    let _ = ctx.console("until reg 0 a0 8 4\nq\n");
    assert_eq!(ctx.steps(), vec![(0, 4), (0, 4)]);
}

#[test]
fn test_zero_interval_is_reported_and_console_continues() {
    let mut ctx = TestContext::new(1);
    let out = ctx.console("until pc 0 1 0\nrs 2\nq\n");
    assert_eq!(out, "error: poll interval must be non-zero\n");
    assert_eq!(ctx.steps(), vec![(0, 2)]);
}

#[test]
fn test_hart_fault_leaves_the_console() {
    let mut ctx = TestContext::build(|log| vec![RecordingHart::new(0, log).faulting_after(2)]);
    let (result, _) = ctx.try_console("rs 4\nq\n");
    assert!(matches!(result, Err(SimError::Hart { hart: 0, .. })));
}
