//! Parent/child relation metadata and cascade rules.

/// What a parent-side operation does to the children of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cascade {
    /// Children are never written through the parent.
    #[default]
    None,
    /// Saves and deletes cascade to children.
    All,
    /// Like `All`, and children removed from the collection are deleted.
    AllDeleteOrphan,
}

impl Cascade {
    /// Does deleting the parent delete the children?
    pub fn includes_delete(&self) -> bool {
        matches!(self, Cascade::All | Cascade::AllDeleteOrphan)
    }

    /// Does saving the parent save new children?
    pub fn includes_save(&self) -> bool {
        matches!(self, Cascade::All | Cascade::AllDeleteOrphan)
    }

    /// Are children dropped from the collection deleted at flush?
    pub fn deletes_orphans(&self) -> bool {
        matches!(self, Cascade::AllDeleteOrphan)
    }
}

/// Static description of one owned child collection.
#[derive(Debug, Clone, Copy)]
pub struct RelationInfo {
    /// Field name on the parent holding the collection
    pub field: &'static str,
    /// Entity type name of the children, resolvable through the registry
    pub child_entity: &'static str,
    /// Column on the child table referencing the parent key
    pub fk_column: &'static str,
    /// Cascade rule applied on save and delete
    pub cascade: Cascade,
    /// An inverse collection is not a write authority: membership persists
    /// only through the child's own back-reference column.
    pub inverse: bool,
}

impl RelationInfo {
    pub const fn new(
        field: &'static str,
        child_entity: &'static str,
        fk_column: &'static str,
    ) -> Self {
        Self {
            field,
            child_entity,
            fk_column,
            cascade: Cascade::None,
            inverse: false,
        }
    }

    pub const fn cascade(mut self, cascade: Cascade) -> Self {
        self.cascade = cascade;
        self
    }

    pub const fn inverse(mut self) -> Self {
        self.inverse = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_rules() {
        assert!(!Cascade::None.includes_delete());
        assert!(Cascade::All.includes_delete());
        assert!(!Cascade::All.deletes_orphans());
        assert!(Cascade::AllDeleteOrphan.deletes_orphans());
    }

    #[test]
    fn relation_builders() {
        const REL: RelationInfo = RelationInfo::new("books", "Book", "library_id")
            .cascade(Cascade::AllDeleteOrphan)
            .inverse();
        assert!(REL.inverse);
        assert!(REL.cascade.deletes_orphans());
    }
}
