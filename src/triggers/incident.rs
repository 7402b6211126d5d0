//! Incident evaluation.
//!
//! Incidents are checked during the INCIDENTS phase. An incident is due when
//! it has not fired this loop, it is scheduled for today (or unscheduled),
//! its culprit is alive and its trigger holds with the incident in scope.

use tracing::warn;

use super::condition::{ConditionError, ConditionEvaluator};
use crate::cards::{GameData, IncidentConfig};
use crate::core::GameState;
use crate::effects::{IncidentScope, ResolutionContext};

impl IncidentConfig {
    /// Culprit and victim, for selectors resolved during the incident.
    #[must_use]
    pub const fn scope(&self) -> IncidentScope {
        IncidentScope {
            incident: self.id,
            culprit: self.culprit,
            victim: self.victim,
        }
    }
}

pub struct IncidentEvaluator;

impl IncidentEvaluator {
    /// Whether `incident` should fire now.
    pub fn is_due(state: &GameState, incident: &IncidentConfig) -> Result<bool, ConditionError> {
        if state.triggered_incidents.contains(&incident.id) {
            return Ok(false);
        }
        if incident.day.is_some_and(|day| day != state.day) {
            return Ok(false);
        }
        if !state.character(incident.culprit).is_some_and(|c| c.alive) {
            return Ok(false);
        }
        let context = ResolutionContext::for_incident(None, incident.scope());
        ConditionEvaluator::check(state, &incident.trigger, &context)
    }

    /// Every incident due now, in script order.
    ///
    /// An incident whose trigger fails to evaluate is skipped and logged.
    pub fn due<'a>(state: &GameState, data: &'a GameData) -> Vec<&'a IncidentConfig> {
        data.script_incidents()
            .filter(|incident| match Self::is_due(state, incident) {
                Ok(due) => due,
                Err(error) => {
                    warn!(
                        incident = %incident.id,
                        condition = incident.trigger.name(),
                        %error,
                        "incident trigger failed to evaluate"
                    );
                    false
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CharacterConfig, ScriptConfig};
    use crate::core::{CharacterId, IncidentId, Location, Player, PlayerId, PlayerRole, Stat};
    use crate::effects::TargetSelector;
    use crate::triggers::Condition;

    fn data() -> GameData {
        let mut script = ScriptConfig::new("Incidents", 2, 3);
        script.incidents = vec![IncidentId(1), IncidentId(2)];
        let mut data = GameData::new(script);
        data.add_character(CharacterConfig::new(CharacterId(1), "Office Worker", Location::City));
        data.add_incident(IncidentConfig::new(
            IncidentId(1),
            "Murder",
            CharacterId(1),
            Condition::stat_at_least(TargetSelector::Culprit, Stat::Paranoia, 2),
        ));
        data.add_incident(IncidentConfig::new(IncidentId(2), "Suicide", CharacterId(1), Condition::Always).on_day(2));
        data
    }

    fn state(data: &GameData) -> GameState {
        let mut state = GameState::new(data, [Player::new(PlayerId(0), "MM", PlayerRole::Mastermind)]);
        state.day = 1;
        state
    }

    #[test]
    fn test_trigger_uses_incident_scope() {
        let data = data();
        let mut state = state(&data);
        assert!(IncidentEvaluator::due(&state, &data).is_empty());

        state.character_mut(CharacterId(1)).unwrap().stats.adjust(Stat::Paranoia, 2);
        let due: Vec<_> = IncidentEvaluator::due(&state, &data).iter().map(|i| i.id).collect();
        assert_eq!(due, vec![IncidentId(1)]);
    }

    #[test]
    fn test_scheduled_day_and_once_per_loop() {
        let data = data();
        let mut state = state(&data);
        state.day = 2;
        let due: Vec<_> = IncidentEvaluator::due(&state, &data).iter().map(|i| i.id).collect();
        assert_eq!(due, vec![IncidentId(2)]);

        state.triggered_incidents.insert(IncidentId(2));
        assert!(IncidentEvaluator::due(&state, &data).is_empty());
    }

    #[test]
    fn test_dead_culprit_never_fires() {
        let data = data();
        let mut state = state(&data);
        state.day = 2;
        state.character_mut(CharacterId(1)).unwrap().alive = false;
        assert!(IncidentEvaluator::due(&state, &data).is_empty());
    }
}
