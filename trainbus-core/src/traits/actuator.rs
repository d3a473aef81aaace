//! Actuator release hook
//!
//! Nodes that hold relay or solenoid coils energised must let go of them
//! before halting, otherwise a turnout coil can burn out while the node
//! sits in its fault loop.

/// Releases every output the node may be holding
pub trait ActuatorRelease {
    /// Drive all actuator outputs to their safe (de-energised) state
    fn release(&mut self);
}

impl<F: FnMut()> ActuatorRelease for F {
    fn release(&mut self) {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_all(hook: &mut impl ActuatorRelease) {
        hook.release();
    }

    #[test]
    fn test_closure_hook() {
        let mut released = 0;
        release_all(&mut || released += 1);
        assert_eq!(released, 1);
    }
}
