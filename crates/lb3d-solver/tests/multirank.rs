//! Single-rank / multi-rank equivalence.
//!
//! Each rank of a decomposition runs the full production solver on its own
//! thread; halo phases move over per-pair FIFO channels (the send half
//! never blocks, so the combined send/receive semantics hold), and the
//! monitor's reductions go through a generation-counted barrier. Because
//! streaming and collision are purely local and the halo delivers the
//! owning rank's exact values, the decomposed run must reproduce the
//! serial run bit for bit.

use anyhow::{bail, ensure, Result};
use lb3d_core::config::{InitialSpec, RunConfig};
use lb3d_core::grid::Axis;
use lb3d_halo::topology::coords_of;
use lb3d_halo::{Comm, PeriodicHook, SerialComm, Topology};
use lb3d_solver::{NullSink, Solver};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

/// Generation-counted all-reduce barrier over `size` participants.
struct AllReduce {
    size: usize,
    state: Mutex<ReduceState>,
    cond: Condvar,
}

#[derive(Default)]
struct ReduceState {
    generation: u64,
    arrived: usize,
    acc: f64,
    result: f64,
}

impl AllReduce {
    fn new(size: usize) -> Self {
        Self {
            size,
            state: Mutex::new(ReduceState::default()),
            cond: Condvar::new(),
        }
    }

    fn sum(&self, local: f64) -> f64 {
        let mut st = self.state.lock().unwrap();
        let generation = st.generation;
        st.acc += local;
        st.arrived += 1;
        if st.arrived == self.size {
            st.result = st.acc;
            st.acc = 0.0;
            st.arrived = 0;
            st.generation += 1;
            self.cond.notify_all();
        } else {
            while st.generation == generation {
                st = self.cond.wait(st).unwrap();
            }
        }
        st.result
    }
}

/// In-process transport: one FIFO channel per ordered rank pair.
struct ThreadComm {
    rank: i32,
    size: i32,
    to_peer: HashMap<i32, Sender<(i32, Vec<f64>)>>,
    from_peer: HashMap<i32, Receiver<(i32, Vec<f64>)>>,
    reduce: Arc<AllReduce>,
}

impl Comm for ThreadComm {
    fn rank(&self) -> i32 {
        self.rank
    }

    fn size(&self) -> i32 {
        self.size
    }

    fn send_receive(
        &mut self,
        to: Option<i32>,
        from: Option<i32>,
        tag: i32,
        send: &[f64],
        recv: &mut [f64],
    ) -> Result<()> {
        if let Some(to) = to {
            self.to_peer[&to]
                .send((tag, send.to_vec()))
                .map_err(|_| anyhow::anyhow!("peer {to} hung up"))?;
        }
        if let Some(from) = from {
            let (got_tag, data) = self.from_peer[&from]
                .recv()
                .map_err(|_| anyhow::anyhow!("peer {from} hung up"))?;
            ensure!(got_tag == tag, "phase skew: expected tag {tag}, got {got_tag}");
            recv.copy_from_slice(&data);
        }
        Ok(())
    }

    fn any_true(&mut self, local: bool) -> Result<bool> {
        Ok(self.reduce.sum(f64::from(u8::from(local))) > 0.0)
    }

    fn sum_f64(&mut self, local: f64) -> Result<f64> {
        Ok(self.reduce.sum(local))
    }

    fn gather_root(&mut self, _send: &[f64], _recv: Option<&mut [f64]>) -> Result<()> {
        bail!("gather is not used by the equivalence test")
    }
}

/// Build the full channel matrix for `size` ranks.
fn make_comms(size: usize) -> Vec<ThreadComm> {
    let reduce = Arc::new(AllReduce::new(size));
    let mut senders: Vec<HashMap<i32, Sender<(i32, Vec<f64>)>>> =
        (0..size).map(|_| HashMap::new()).collect();
    let mut receivers: Vec<HashMap<i32, Receiver<(i32, Vec<f64>)>>> =
        (0..size).map(|_| HashMap::new()).collect();
    for src in 0..size {
        for dst in 0..size {
            let (tx, rx) = channel();
            senders[src].insert(dst as i32, tx);
            receivers[dst].insert(src as i32, rx);
        }
    }
    senders
        .into_iter()
        .zip(receivers)
        .enumerate()
        .map(|(rank, (to_peer, from_peer))| ThreadComm {
            rank: rank as i32,
            size: size as i32,
            to_peer,
            from_peer,
            reduce: Arc::clone(&reduce),
        })
        .collect()
}

/// Interior macro state in global `(z, y, x)` order: rho, u, v, w.
type GlobalFields = [Vec<f64>; 4];

fn blank(global: [usize; 3]) -> GlobalFields {
    let n = global[0] * global[1] * global[2];
    [vec![0.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n]]
}

/// Scatter one solver's interior into the global arrays.
fn deposit<C: Comm>(
    out: &mut GlobalFields,
    global: [usize; 3],
    solver: &Solver<C, PeriodicHook, NullSink>,
) {
    let grid = solver.grid();
    let topo = solver.topology();
    let m = solver.macros();
    let local = grid.interior();
    let ghost = grid.ghost();
    let coords = topo.coords();
    for k in grid.interior_range(Axis::Z) {
        for j in grid.interior_range(Axis::Y) {
            for i in grid.interior_range(Axis::X) {
                let gx = coords[0] as usize * local[0] + (i - ghost);
                let gy = coords[1] as usize * local[1] + (j - ghost);
                let gz = coords[2] as usize * local[2] + (k - ghost);
                let g = gx + global[0] * (gy + global[1] * gz);
                let at = grid.idx3(i, j, k);
                out[0][g] = m.rho.data()[at];
                out[1][g] = m.u.data()[at];
                out[2][g] = m.v.data()[at];
                out[3][g] = m.w.data()[at];
            }
        }
    }
}

fn base_config() -> RunConfig {
    let mut cfg = RunConfig::example();
    cfg.nx = 8;
    cfg.ny = 8;
    cfg.nz = 8;
    cfg.tau = Some(0.8);
    cfg.steps = 6;
    cfg.output_every = 6;
    cfg.check_every = 3;
    cfg.initial = InitialSpec::TaylorGreen {
        velocity_scale: 0.02,
    };
    cfg
}

fn run_serial(cfg: &RunConfig) -> GlobalFields {
    let mut cfg = cfg.clone();
    cfg.px = 1;
    cfg.py = 1;
    cfg.pz = 1;
    let topo = Topology::single(cfg.periodic);
    let global = [cfg.nx, cfg.ny, cfg.nz];
    let mut solver = Solver::new(cfg, topo, SerialComm, PeriodicHook, NullSink).unwrap();
    solver.run().unwrap();
    let mut out = blank(global);
    deposit(&mut out, global, &solver);
    out
}

fn run_decomposed(cfg: &RunConfig, dims: [usize; 3]) -> GlobalFields {
    let mut cfg = cfg.clone();
    cfg.px = dims[0];
    cfg.py = dims[1];
    cfg.pz = dims[2];
    let size = cfg.ranks();
    let global = [cfg.nx, cfg.ny, cfg.nz];
    let idims = [dims[0] as i32, dims[1] as i32, dims[2] as i32];

    let comms = make_comms(size);
    let mut handles = Vec::new();
    for (rank, comm) in comms.into_iter().enumerate() {
        let cfg = cfg.clone();
        handles.push(thread::spawn(move || {
            let topo =
                Topology::from_parts(idims, coords_of(idims, rank as i32), cfg.periodic).unwrap();
            let mut solver = Solver::new(cfg, topo, comm, PeriodicHook, NullSink).unwrap();
            solver.run().unwrap();
            let mut out = blank(global);
            deposit(&mut out, global, &solver);
            out
        }));
    }

    let mut merged = blank(global);
    for handle in handles {
        let part = handle.join().expect("rank thread panicked");
        for (dst, src) in merged.iter_mut().zip(part) {
            for (d, s) in dst.iter_mut().zip(src) {
                // Ownership is disjoint, so summing the zero-initialized
                // parts is an exact scatter.
                *d += s;
            }
        }
    }
    merged
}

fn assert_identical(a: &GlobalFields, b: &GlobalFields, what: &str) {
    for (name, (fa, fb)) in ["rho", "u", "v", "w"].iter().zip(a.iter().zip(b.iter())) {
        for (n, (x, y)) in fa.iter().zip(fb.iter()).enumerate() {
            assert!(
                x == y,
                "{what}: field {name} differs at voxel {n}: {x} vs {y}"
            );
        }
    }
}

#[test]
fn two_rank_slab_decomposition_matches_serial() {
    let cfg = base_config();
    let serial = run_serial(&cfg);
    let decomposed = run_decomposed(&cfg, [2, 1, 1]);
    assert_identical(&serial, &decomposed, "2x1x1");
}

#[test]
fn eight_rank_box_decomposition_matches_serial() {
    let cfg = base_config();
    let serial = run_serial(&cfg);
    let decomposed = run_decomposed(&cfg, [2, 2, 2]);
    assert_identical(&serial, &decomposed, "2x2x2");
}
