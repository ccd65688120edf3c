use crate::models::ListenRecord;

/// Append-only log of every listen collected for one report.
///
/// Preserves the order in which listens were received.
#[derive(Debug, Clone, Default)]
pub struct ListenLog {
    listens: Vec<ListenRecord>,
}

impl ListenLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listen: ListenRecord) {
        self.listens.push(listen);
    }

    pub fn extend<I>(&mut self, listens: I)
    where
        I: IntoIterator<Item = ListenRecord>,
    {
        self.listens.extend(listens);
    }

    /// Total number of listens appended so far
    pub fn count(&self) -> usize {
        self.listens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListenRecord> {
        self.listens.iter()
    }
}

impl FromIterator<ListenRecord> for ListenLog {
    fn from_iter<I: IntoIterator<Item = ListenRecord>>(iter: I) -> Self {
        Self {
            listens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ListenLog {
    type Item = &'a ListenRecord;
    type IntoIter = std::slice::Iter<'a, ListenRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_arrival_order_and_count() {
        let mut log = ListenLog::new();
        assert!(log.is_empty());

        log.push(ListenRecord::new(1, "Boards of Canada", "Roygbiv"));
        log.extend(vec![
            ListenRecord::new(2, "Stereolab", "French Disko"),
            ListenRecord::new(3, "Broadcast", "Pendulum"),
        ]);

        assert_eq!(log.count(), 3);
        let tracks: Vec<&str> = log.iter().map(|l| l.track_name()).collect();
        assert_eq!(tracks, vec!["Roygbiv", "French Disko", "Pendulum"]);
    }
}
