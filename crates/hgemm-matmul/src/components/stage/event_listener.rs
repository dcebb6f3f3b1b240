use core::fmt::Display;

use super::BufferId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Events that occur while a pipeline streams k slices through the staging slots.
///
/// `epoch` is the number of cube barriers crossed when the event happened.
pub enum PipelineEvent {
    /// A k slice was written to a slot.
    Load {
        buffer: BufferId,
        slice: usize,
        epoch: u32,
    },
    /// Warps read a k slice from a slot.
    Compute {
        buffer: BufferId,
        slice: usize,
        epoch: u32,
    },
    /// A cube barrier closed the epoch.
    Barrier { epoch: u32 },
}

/// Function that is called at each [PipelineEvent]
pub trait PipelineEventListener {
    fn on_event(&mut self, event: PipelineEvent);
}

#[derive(Debug, Default, Clone, Copy)]
/// Use when there is no event listening to do
pub struct NoEvent;

impl PipelineEventListener for NoEvent {
    fn on_event(&mut self, _event: PipelineEvent) {
        // Nothing to do
    }
}

/// Ordering violation between the loads and the computes of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineHazard {
    /// A slot was read in the same epoch it was written.
    UnsyncedRead {
        buffer: BufferId,
        slice: usize,
        epoch: u32,
    },
    /// A slot was read while holding another slice than the one computed, or nothing at all.
    StaleRead {
        buffer: BufferId,
        expected: usize,
        found: Option<usize>,
        epoch: u32,
    },
    /// A slot was written in the same epoch it was read.
    OverwriteInUse {
        buffer: BufferId,
        slice: usize,
        epoch: u32,
    },
}

impl Display for PipelineHazard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineHazard::UnsyncedRead {
                buffer,
                slice,
                epoch,
            } => write!(
                f,
                "Slice {slice} was read from buffer {buffer:?} before a barrier (epoch {epoch})"
            ),
            PipelineHazard::StaleRead {
                buffer,
                expected,
                found: Some(found),
                epoch,
            } => write!(
                f,
                "Expected slice {expected} in buffer {buffer:?}, found slice {found} (epoch {epoch})"
            ),
            PipelineHazard::StaleRead {
                buffer,
                expected,
                found: None,
                epoch,
            } => write!(
                f,
                "Expected slice {expected} in buffer {buffer:?}, but it was never loaded (epoch {epoch})"
            ),
            PipelineHazard::OverwriteInUse {
                buffer,
                slice,
                epoch,
            } => write!(
                f,
                "Slice {slice} overwrote buffer {buffer:?} while it was being read (epoch {epoch})"
            ),
        }
    }
}

impl core::error::Error for PipelineHazard {}

#[derive(Default, Debug, Clone, Copy)]
struct BufferState {
    written: Option<(usize, u32)>,
    read_epoch: Option<u32>,
}

/// Records every pipeline event of a cube to check the staging order afterwards.
#[derive(Default, Debug, Clone)]
pub struct PipelineTrace {
    events: Vec<PipelineEvent>,
}

impl PipelineEventListener for PipelineTrace {
    fn on_event(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }
}

impl PipelineTrace {
    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Number of k slices computed.
    pub fn num_computes(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, PipelineEvent::Compute { .. }))
            .count()
    }

    /// Replays the events and returns the first hazard.
    ///
    /// A compute must read the slice it asks for, written in an earlier epoch. A load must not
    /// target a slot read during the same epoch.
    pub fn validate(&self) -> Result<(), PipelineHazard> {
        let mut buffers = [BufferState::default(); 2];

        for event in self.events.iter() {
            match *event {
                PipelineEvent::Load {
                    buffer,
                    slice,
                    epoch,
                } => {
                    let state = &mut buffers[buffer.index()];
                    if state.read_epoch == Some(epoch) {
                        return Err(PipelineHazard::OverwriteInUse {
                            buffer,
                            slice,
                            epoch,
                        });
                    }
                    state.written = Some((slice, epoch));
                }
                PipelineEvent::Compute {
                    buffer,
                    slice,
                    epoch,
                } => {
                    let state = &mut buffers[buffer.index()];
                    match state.written {
                        None => {
                            return Err(PipelineHazard::StaleRead {
                                buffer,
                                expected: slice,
                                found: None,
                                epoch,
                            });
                        }
                        Some((_, written_epoch)) if written_epoch == epoch => {
                            return Err(PipelineHazard::UnsyncedRead {
                                buffer,
                                slice,
                                epoch,
                            });
                        }
                        Some((found, _)) if found != slice => {
                            return Err(PipelineHazard::StaleRead {
                                buffer,
                                expected: slice,
                                found: Some(found),
                                epoch,
                            });
                        }
                        Some(_) => state.read_epoch = Some(epoch),
                    }
                }
                PipelineEvent::Barrier { .. } => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(buffer: BufferId, slice: usize, epoch: u32) -> PipelineEvent {
        PipelineEvent::Load {
            buffer,
            slice,
            epoch,
        }
    }

    fn compute(buffer: BufferId, slice: usize, epoch: u32) -> PipelineEvent {
        PipelineEvent::Compute {
            buffer,
            slice,
            epoch,
        }
    }

    fn trace(events: &[PipelineEvent]) -> PipelineTrace {
        let mut trace = PipelineTrace::default();
        for event in events {
            trace.on_event(*event);
        }
        trace
    }

    #[test]
    fn double_buffering_is_valid() {
        let trace = trace(&[
            load(BufferId::A, 0, 0),
            PipelineEvent::Barrier { epoch: 0 },
            compute(BufferId::A, 0, 1),
            load(BufferId::B, 1, 1),
            PipelineEvent::Barrier { epoch: 1 },
            compute(BufferId::B, 1, 2),
            load(BufferId::A, 2, 2),
            PipelineEvent::Barrier { epoch: 2 },
            compute(BufferId::A, 2, 3),
        ]);

        assert_eq!(trace.validate(), Ok(()));
        assert_eq!(trace.num_computes(), 3);
    }

    #[test]
    fn read_before_barrier_is_detected() {
        let trace = trace(&[load(BufferId::A, 0, 0), compute(BufferId::A, 0, 0)]);

        assert_eq!(
            trace.validate(),
            Err(PipelineHazard::UnsyncedRead {
                buffer: BufferId::A,
                slice: 0,
                epoch: 0
            })
        );
    }

    #[test]
    fn swap_skipped_is_detected() {
        // Slice 1 computed from the slot still holding slice 0.
        let trace = trace(&[
            load(BufferId::A, 0, 0),
            compute(BufferId::A, 0, 1),
            load(BufferId::B, 1, 1),
            compute(BufferId::A, 1, 2),
        ]);

        assert_eq!(
            trace.validate(),
            Err(PipelineHazard::StaleRead {
                buffer: BufferId::A,
                expected: 1,
                found: Some(0),
                epoch: 2
            })
        );
    }

    #[test]
    fn overwrite_of_current_slot_is_detected() {
        let trace = trace(&[
            load(BufferId::A, 0, 0),
            compute(BufferId::A, 0, 1),
            load(BufferId::A, 1, 1),
        ]);

        assert!(matches!(
            trace.validate(),
            Err(PipelineHazard::OverwriteInUse { slice: 1, .. })
        ));
    }

    #[test]
    fn compute_of_empty_slot_is_detected() {
        let trace = trace(&[compute(BufferId::B, 0, 0)]);

        let err = trace.validate().unwrap_err();
        assert!(err.to_string().contains("never loaded"));
    }
}
