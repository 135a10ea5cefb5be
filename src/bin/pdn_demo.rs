//! Small diagnostic binary exercising the core solver end to end: no
//! netlist parsing, just a hand-built parallel-pad scenario run through a
//! forward solve, an Alter round-trip, and an adjoint gradient.

use pdn_core::branch::{BranchStore, BranchType};
use pdn_core::circuit::Circuit;

fn main() {
    env_logger_init();

    // Parallel pads: nodes {0,1,x1,x2,s}; v: s->0=1.8; gx1: 1->x1=10;
    // gx2: 1->x2=10; g: x1->s=1000; g: x2->s=1000; i: 1->0=0.1.
    let store = BranchStore::new(
        vec!["0".into(), "1".into(), "x1".into(), "x2".into(), "s".into()],
        vec![
            "v1".into(),
            "gx1".into(),
            "gx2".into(),
            "g1".into(),
            "g2".into(),
            "i1".into(),
        ],
        vec![4, 1, 1, 2, 3, 1],
        vec![0, 2, 3, 4, 4, 0],
        vec![
            BranchType::Voltage,
            BranchType::Conductance,
            BranchType::Conductance,
            BranchType::Conductance,
            BranchType::Conductance,
            BranchType::Current,
        ],
        vec![1.8, 10.0, 10.0, 1000.0, 1000.0, 0.1],
    )
    .expect("well-formed branch set");

    let mut circuit = Circuit::new(store);
    circuit.solve().expect("initial solve");

    let i1 = circuit.store().branch_index_of("i1").unwrap();
    let v1 = circuit.branch_voltage(&[i1]).unwrap()[0];
    log::info!("V(1) = {v1:.6}");

    let gx1 = circuit.store().branch_index_of("gx1").unwrap();
    circuit.alter(&[gx1], &[20.0]).expect("alter gx1");
    circuit.solve().expect("re-solve after LU invalidation");
    let v1_after = circuit.branch_voltage(&[i1]).unwrap()[0];
    log::info!("V(1) after widening gx1 = {v1_after:.6}");

    println!("V(1) = {v1:.6} -> {v1_after:.6} after widening gx1");
}

fn env_logger_init() {
    // The library only emits `log` calls and never installs a subscriber,
    // so this binary installs a minimal one to see them; any host embedding
    // the core would install its own instead.
    let _ = log::set_logger(&EPRINT_LOGGER);
    log::set_max_level(log::LevelFilter::Info);
}

struct EprintLogger;
static EPRINT_LOGGER: EprintLogger = EprintLogger;

impl log::Log for EprintLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        eprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}
