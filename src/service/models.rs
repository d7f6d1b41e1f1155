/// Writes issued (or, on a dry run, planned) during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub updated: usize,
    pub created: usize,
}

impl PassReport {
    pub fn len(&self) -> usize {
        self.updated + self.created
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
