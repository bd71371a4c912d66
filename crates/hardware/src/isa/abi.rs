//! RISC-V Application Binary Interface (ABI) register names.
//!
//! Maps the names an operator types at the console (`a0`, `sp`, `ft3`, `x5`, `f12`, or a
//! bare index) to register indices.

/// Integer register ABI names, indexed by register number.
pub const XPR_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Floating-point register ABI names, indexed by register number.
pub const FPR_NAMES: [&str; 32] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7", "fs0", "fs1", "fa0", "fa1", "fa2",
    "fa3", "fa4", "fa5", "fa6", "fa7", "fs2", "fs3", "fs4", "fs5", "fs6", "fs7", "fs8", "fs9",
    "fs10", "fs11", "ft8", "ft9", "ft10", "ft11",
];

/// Register x10 (first argument/return value, a0).
pub const REG_A0: usize = 10;

fn parse_indexed(name: &str, prefix: char, table: &[&str; 32]) -> Option<usize> {
    let numbered = |s: &str| s.parse::<usize>().ok().filter(|&i| i < 32);
    numbered(name)
        .or_else(|| name.strip_prefix(prefix).and_then(numbered))
        .or_else(|| table.iter().position(|&n| n == name))
}

/// Resolves an integer register name (`a0`, `x10`, `10`); `fp` is accepted for `s0`.
pub fn xpr_index(name: &str) -> Option<usize> {
    if name == "fp" {
        return Some(8);
    }
    parse_indexed(name, 'x', &XPR_NAMES)
}

/// Resolves a floating-point register name (`fa0`, `f10`, `10`).
pub fn fpr_index(name: &str) -> Option<usize> {
    parse_indexed(name, 'f', &FPR_NAMES)
}
