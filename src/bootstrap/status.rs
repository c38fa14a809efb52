//! Bootstrap status machine with transition-guarded actions.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// Where the bootstrap stands for the current page load
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BootstrapStatus {
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
}

impl BootstrapStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, BootstrapStatus::Loading)
    }
}

/// Side effect requested by a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Redirect to the identity provider's hosted sign-in
    FederatedSignIn,
}

/// Fires `effect` whenever the machine enters `to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionRule {
    pub to: BootstrapStatus,
    /// Only fire once the identity client has been configured
    pub requires_configured: bool,
    pub effect: Effect,
}

impl TransitionRule {
    /// Redirect on entering `Unauthenticated`, if the client is configured.
    pub fn sign_in_on_unauthenticated() -> Self {
        Self {
            to: BootstrapStatus::Unauthenticated,
            requires_configured: true,
            effect: Effect::FederatedSignIn,
        }
    }
}

/// `Loading -> {Authenticated | Unauthenticated}`, nothing else.
///
/// Effects are produced per transition, so re-entering the current status
/// is a no-op and never repeats an effect.
#[derive(Debug, Clone)]
pub struct StatusMachine {
    status: BootstrapStatus,
    configured: bool,
    rules: Vec<TransitionRule>,
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::with_rules(vec![TransitionRule::sign_in_on_unauthenticated()])
    }
}

impl StatusMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<TransitionRule>) -> Self {
        Self {
            status: BootstrapStatus::Loading,
            configured: false,
            rules,
        }
    }

    pub fn status(&self) -> BootstrapStatus {
        self.status
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn mark_configured(&mut self) {
        self.configured = true;
    }

    /// Move to `to` and return the effects its rules request.
    pub fn transition(&mut self, to: BootstrapStatus) -> Result<Vec<Effect>, TransitionError> {
        let from = self.status;
        if from == to {
            return Ok(Vec::new());
        }
        if from != BootstrapStatus::Loading || to == BootstrapStatus::Loading {
            return Err(TransitionError { from, to });
        }

        self.status = to;
        Ok(self
            .rules
            .iter()
            .filter(|rule| rule.to == to && (!rule.requires_configured || self.configured))
            .map(|rule| rule.effect.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_loading() {
        let machine = StatusMachine::new();
        assert_eq!(machine.status(), BootstrapStatus::Loading);
        assert!(!machine.status().is_settled());
        assert!(!machine.is_configured());
    }

    #[test]
    fn test_authenticated_has_no_effects() {
        let mut machine = StatusMachine::new();
        machine.mark_configured();
        assert_eq!(machine.transition(BootstrapStatus::Authenticated), Ok(vec![]));
        assert_eq!(machine.status(), BootstrapStatus::Authenticated);
    }

    #[test]
    fn test_unauthenticated_requests_sign_in_once() {
        let mut machine = StatusMachine::new();
        machine.mark_configured();

        assert_eq!(
            machine.transition(BootstrapStatus::Unauthenticated),
            Ok(vec![Effect::FederatedSignIn])
        );
        // Same value again is not a transition
        assert_eq!(machine.transition(BootstrapStatus::Unauthenticated), Ok(vec![]));
    }

    #[test]
    fn test_unconfigured_unauthenticated_has_no_redirect() {
        let mut machine = StatusMachine::new();
        assert_eq!(machine.transition(BootstrapStatus::Unauthenticated), Ok(vec![]));
        assert_eq!(machine.status(), BootstrapStatus::Unauthenticated);
    }

    #[test]
    fn test_never_regresses_to_loading() {
        for settled in [BootstrapStatus::Authenticated, BootstrapStatus::Unauthenticated] {
            let mut machine = StatusMachine::new();
            machine.transition(settled).unwrap();

            assert_eq!(
                machine.transition(BootstrapStatus::Loading),
                Err(TransitionError {
                    from: settled,
                    to: BootstrapStatus::Loading
                })
            );
            assert_eq!(machine.status(), settled);
        }
    }

    #[test]
    fn test_settled_states_are_final() {
        let mut machine = StatusMachine::new();
        machine.mark_configured();
        machine.transition(BootstrapStatus::Authenticated).unwrap();

        assert!(machine.transition(BootstrapStatus::Unauthenticated).is_err());
        assert_eq!(machine.status(), BootstrapStatus::Authenticated);
    }

    #[test]
    fn test_custom_rules() {
        let mut machine = StatusMachine::with_rules(vec![TransitionRule {
            to: BootstrapStatus::Unauthenticated,
            requires_configured: false,
            effect: Effect::FederatedSignIn,
        }]);
        assert_eq!(
            machine.transition(BootstrapStatus::Unauthenticated),
            Ok(vec![Effect::FederatedSignIn])
        );
    }
}
