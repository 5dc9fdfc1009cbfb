//! Redraw-cycle phase machine
//!
//! Every redraw cycle walks the same fixed order: Highlighted (only when a
//! selection exists), Normal, Hidden (only when ghosting applies), then
//! Finished. The machine is the sole authority on the current phase; draws
//! for a phase run until the queue exhausts, and only then may the machine
//! advance. Out-of-order phases cannot be expressed through this API.

/// Current override-material mode of the redraw cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// Selection-emphasis geometry
    Highlighted,
    /// Regular visible geometry
    Normal,
    /// Ghosted/faded hidden geometry
    Hidden,
    /// Terminal: the cycle's final composite has been produced
    Finished,
}

/// Conditions consulted when the queue exhausts a phase
#[derive(Debug, Clone, Copy)]
pub struct AdvanceContext {
    /// Every batch is visible; no ghosted pass applies
    pub all_visible: bool,
    /// Ghosted rendering of hidden geometry is enabled
    pub ghosting_enabled: bool,
    /// Any in-progress ground reflection has settled (finished, culled, or
    /// unable to run); gates the Normal to Hidden transition so the
    /// reflection is never drawn over unsettled outlines
    pub reflection_settled: bool,
}

/// Result of an advance attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    /// The machine moved to this phase
    Entered(RenderPhase),
    /// The transition is pending an external condition; retry next tick
    Blocked,
    /// The cycle was already finished; nothing to do
    AlreadyFinished,
}

/// Phase state machine for one redraw cycle
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phase: RenderPhase,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self {
            phase: RenderPhase::Finished,
        }
    }
}

impl PhaseMachine {
    /// Create a machine with no cycle in progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active phase
    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Whether the current cycle has produced its final composite
    pub fn is_finished(&self) -> bool {
        self.phase == RenderPhase::Finished
    }

    /// Begin a new redraw cycle
    ///
    /// Starts at `Highlighted` when the queue reports highlighted geometry,
    /// otherwise directly at `Normal`. Returns the entered phase.
    pub fn restart(&mut self, has_highlighted: bool) -> RenderPhase {
        self.phase = if has_highlighted {
            RenderPhase::Highlighted
        } else {
            RenderPhase::Normal
        };
        self.phase
    }

    /// Advance after the queue exhausted the current phase
    pub fn advance(&mut self, context: AdvanceContext) -> PhaseTransition {
        match self.phase {
            RenderPhase::Highlighted => {
                self.phase = RenderPhase::Normal;
                PhaseTransition::Entered(RenderPhase::Normal)
            }
            RenderPhase::Normal => {
                if context.all_visible || !context.ghosting_enabled {
                    self.phase = RenderPhase::Finished;
                    PhaseTransition::Entered(RenderPhase::Finished)
                } else if context.reflection_settled {
                    self.phase = RenderPhase::Hidden;
                    PhaseTransition::Entered(RenderPhase::Hidden)
                } else {
                    PhaseTransition::Blocked
                }
            }
            RenderPhase::Hidden => {
                self.phase = RenderPhase::Finished;
                PhaseTransition::Entered(RenderPhase::Finished)
            }
            RenderPhase::Finished => PhaseTransition::AlreadyFinished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_context() -> AdvanceContext {
        AdvanceContext {
            all_visible: false,
            ghosting_enabled: true,
            reflection_settled: true,
        }
    }

    #[test]
    fn test_full_cycle_visits_phases_in_order() {
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.restart(true), RenderPhase::Highlighted);
        assert_eq!(
            machine.advance(open_context()),
            PhaseTransition::Entered(RenderPhase::Normal)
        );
        assert_eq!(
            machine.advance(open_context()),
            PhaseTransition::Entered(RenderPhase::Hidden)
        );
        assert_eq!(
            machine.advance(open_context()),
            PhaseTransition::Entered(RenderPhase::Finished)
        );
        assert_eq!(
            machine.advance(open_context()),
            PhaseTransition::AlreadyFinished
        );
    }

    #[test]
    fn test_no_highlight_starts_at_normal() {
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.restart(false), RenderPhase::Normal);
    }

    #[test]
    fn test_all_visible_skips_hidden() {
        let mut machine = PhaseMachine::new();
        machine.restart(false);
        let transition = machine.advance(AdvanceContext {
            all_visible: true,
            ..open_context()
        });
        assert_eq!(transition, PhaseTransition::Entered(RenderPhase::Finished));
    }

    #[test]
    fn test_ghosting_disabled_skips_hidden() {
        let mut machine = PhaseMachine::new();
        machine.restart(false);
        let transition = machine.advance(AdvanceContext {
            ghosting_enabled: false,
            ..open_context()
        });
        assert_eq!(transition, PhaseTransition::Entered(RenderPhase::Finished));
    }

    #[test]
    fn test_unsettled_reflection_blocks_hidden() {
        let mut machine = PhaseMachine::new();
        machine.restart(false);
        let blocked = machine.advance(AdvanceContext {
            reflection_settled: false,
            ..open_context()
        });
        assert_eq!(blocked, PhaseTransition::Blocked);
        // Still in Normal; the transition retries once the gate opens
        assert_eq!(machine.phase(), RenderPhase::Normal);
        assert_eq!(
            machine.advance(open_context()),
            PhaseTransition::Entered(RenderPhase::Hidden)
        );
    }

    #[test]
    fn test_restart_resets_finished_cycle() {
        let mut machine = PhaseMachine::new();
        machine.restart(false);
        machine.advance(AdvanceContext {
            all_visible: true,
            ..open_context()
        });
        assert!(machine.is_finished());
        assert_eq!(machine.restart(true), RenderPhase::Highlighted);
    }
}
