// crates/lb3d-halo/src/comm.rs

//! The transport seam between the exchange protocol and whatever moves the
//! bytes.
//!
//! [`Comm`] carries exactly the operations the solver suspends on: the
//! combined send/receive of one halo phase, the global reductions of the
//! numerical monitor, and the collective gather of the snapshot writer.
//! [`SerialComm`] is the 1×1×1 implementation; the MPI one lives in
//! [`crate::mpi_comm`].

use anyhow::{bail, ensure, Result};

/// Inter-process transport as seen by the exchange, monitor, and writer.
pub trait Comm {
    /// This rank's id.
    fn rank(&self) -> i32;

    /// Total rank count.
    fn size(&self) -> i32;

    /// Combined send/receive of one halo phase.
    ///
    /// Sends `send` to `to` and fills `recv` from `from`, simultaneously
    /// and without deadlock in a fully synchronous ring. A `None` partner
    /// skips that half (domain-boundary face); `recv` is then left
    /// untouched. `tag` separates the six phase directions.
    fn send_receive(
        &mut self,
        to: Option<i32>,
        from: Option<i32>,
        tag: i32,
        send: &[f64],
        recv: &mut [f64],
    ) -> Result<()>;

    /// Global OR over one boolean per rank.
    fn any_true(&mut self, local: bool) -> Result<bool>;

    /// Global sum over one double per rank.
    fn sum_f64(&mut self, local: f64) -> Result<f64>;

    /// Collective gather of equal-sized contributions to rank 0, in rank
    /// order. `recv` must be `Some` exactly on rank 0 and hold
    /// `size() · send.len()` elements.
    fn gather_root(&mut self, send: &[f64], recv: Option<&mut [f64]>) -> Result<()>;
}

/// Single-rank transport: the only legal partner is rank 0 itself (a fully
/// periodic 1×1×1 grid), and a self-exchange is a copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl Comm for SerialComm {
    fn rank(&self) -> i32 {
        0
    }

    fn size(&self) -> i32 {
        1
    }

    fn send_receive(
        &mut self,
        to: Option<i32>,
        from: Option<i32>,
        _tag: i32,
        send: &[f64],
        recv: &mut [f64],
    ) -> Result<()> {
        match (to, from) {
            (Some(0), Some(0)) => {
                ensure!(
                    send.len() == recv.len(),
                    "slab length mismatch in self-exchange: {} vs {}",
                    send.len(),
                    recv.len()
                );
                recv.copy_from_slice(send);
                Ok(())
            }
            (None, None) => Ok(()),
            (to, from) => bail!("serial transport has a single rank, got to={to:?} from={from:?}"),
        }
    }

    fn any_true(&mut self, local: bool) -> Result<bool> {
        Ok(local)
    }

    fn sum_f64(&mut self, local: f64) -> Result<f64> {
        Ok(local)
    }

    fn gather_root(&mut self, send: &[f64], recv: Option<&mut [f64]>) -> Result<()> {
        let Some(recv) = recv else {
            bail!("gather on the serial transport requires the root buffer")
        };
        ensure!(
            recv.len() == send.len(),
            "gather buffer mismatch: {} vs {}",
            recv.len(),
            send.len()
        );
        recv.copy_from_slice(send);
        Ok(())
    }
}
