//! Parsed event logs: activity sequences with multiplicities.

/// One observed activity sequence and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub activities: Vec<String>,
    pub count: u64,
}

impl Trace {
    pub fn new<I, S>(activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_count(activities, 1)
    }

    pub fn with_count<I, S>(activities: I, count: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            activities: activities.into_iter().map(Into::into).collect(),
            count,
        }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// A multiset of traces as read from an uploaded log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    pub traces: Vec<Trace>,
}

impl EventLog {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self { traces }
    }

    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(Trace::is_empty)
    }

    /// Total number of observed trace instances, multiplicities included.
    pub fn total_traces(&self) -> u64 {
        self.traces.iter().map(|trace| trace.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_multiplicities() {
        let log = EventLog::new(vec![
            Trace::with_count(["a", "b"], 3),
            Trace::new(["a"]),
        ]);
        assert_eq!(log.total_traces(), 4);
        assert!(!log.is_empty());
    }

    #[test]
    fn empty_traces_make_an_empty_log() {
        let log = EventLog::new(vec![Trace::new(Vec::<String>::new())]);
        assert!(log.is_empty());
    }
}
