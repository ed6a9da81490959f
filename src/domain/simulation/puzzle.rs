use std::collections::BTreeMap;

use super::tense::Tense;

/// Puzzle-stage counters. Flags are counters that stop mattering past one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Counter {
    Tool,
    CarRepaired,
    Driving,
    Arrived,
    Wood,
    BridgeBuilt,
    DogsFed,
    FlagsPast,
    FlagsPresent,
}

/// Monotonic progress of one level. Counters can only go up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PuzzleState {
    counters: BTreeMap<Counter, u32>,
}

impl PuzzleState {
    pub fn get(&self, counter: Counter) -> u32 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn is_set(&self, counter: Counter) -> bool {
        self.get(counter) > 0
    }

    pub fn bump(&mut self, counter: Counter) -> u32 {
        let v = self.counters.entry(counter).or_insert(0);
        *v = v.saturating_add(1);
        *v
    }
}

/// Predicate over a level's tense and progress, used to gate visibility,
/// walls, interactions and hazards.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Always,
    In(Tense),
    AtLeast(Counter, u32),
    Below(Counter, u32),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn holds(&self, tense: Tense, puzzle: &PuzzleState) -> bool {
        match self {
            Condition::Always => true,
            Condition::In(t) => *t == tense,
            Condition::AtLeast(c, n) => puzzle.get(*c) >= *n,
            Condition::Below(c, n) => puzzle.get(*c) < *n,
            Condition::All(all) => all.iter().all(|c| c.holds(tense, puzzle)),
            Condition::Any(any) => any.iter().any(|c| c.holds(tense, puzzle)),
        }
    }

    pub fn past_and(other: Condition) -> Self {
        Condition::All(vec![Condition::In(Tense::Past), other])
    }

    pub fn present_and(other: Condition) -> Self {
        Condition::All(vec![Condition::In(Tense::Present), other])
    }
}
