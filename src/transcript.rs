use crate::types::Turn;

/// Ordered conversation history for the running session.
///
/// Only append and clear mutate it. Role alternation is not checked; the
/// session flow is what keeps user/assistant turns paired.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn append_keeps_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("one"));
        transcript.append(Turn::assistant("two"));
        transcript.append(Turn::user("three"));

        let contents: Vec<&str> = transcript.iter().map(Turn::content).collect();
        assert_eq!(contents, ["one", "two", "three"]);
        assert_eq!(transcript.last().map(Turn::role), Some(Role::User));
    }

    #[test]
    fn allows_duplicates_and_repeated_roles() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("same"));
        transcript.append(Turn::user("same"));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.snapshot()[0], transcript.snapshot()[1]);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("hello"));
        transcript.clear();
        assert!(transcript.is_empty());
        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript, Transcript::new());
    }
}
