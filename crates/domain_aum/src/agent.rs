//! Investor to agent assignments

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, InvestorId};

/// One versioned row of the agent assignment history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAssignment {
    pub investor_id: InvestorId,
    pub agent_id: AgentId,
    pub effective_date: NaiveDate,
}

/// Current agent per investor
#[derive(Debug, Clone, Default)]
pub struct AgentAssignments {
    current: HashMap<InvestorId, AgentId>,
}

impl AgentAssignments {
    /// Wraps an already-resolved investor to agent mapping
    pub fn from_current(current: HashMap<InvestorId, AgentId>) -> Self {
        Self { current }
    }

    /// Resolves a full history to the assignment with the latest effective date
    ///
    /// When two assignments share the latest date the one seen last wins.
    pub fn from_history(history: impl IntoIterator<Item = AgentAssignment>) -> Self {
        let mut latest: HashMap<InvestorId, (NaiveDate, AgentId)> = HashMap::new();
        for assignment in history {
            match latest.get(&assignment.investor_id) {
                Some((date, _)) if *date > assignment.effective_date => {}
                _ => {
                    latest.insert(
                        assignment.investor_id,
                        (assignment.effective_date, assignment.agent_id),
                    );
                }
            }
        }

        Self {
            current: latest
                .into_iter()
                .map(|(investor, (_, agent))| (investor, agent))
                .collect(),
        }
    }

    /// The investor's current agent, if any
    pub fn agent_for(&self, investor_id: &InvestorId) -> Option<AgentId> {
        self.current.get(investor_id).copied()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(investor: &str, agent: i32, day: u32) -> AgentAssignment {
        AgentAssignment {
            investor_id: InvestorId::new(investor),
            agent_id: AgentId::new(agent),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        }
    }

    #[test]
    fn test_latest_effective_date_wins() {
        let agents = AgentAssignments::from_history([
            assignment("I1", 10, 5),
            assignment("I1", 20, 1),
            assignment("I2", 30, 3),
        ]);

        assert_eq!(agents.agent_for(&InvestorId::new("I1")), Some(AgentId::new(10)));
        assert_eq!(agents.agent_for(&InvestorId::new("I2")), Some(AgentId::new(30)));
        assert_eq!(agents.agent_for(&InvestorId::new("I3")), None);
        assert_eq!(agents.len(), 2);
    }
}
