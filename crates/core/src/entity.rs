//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Lots, products, users and movements are all entities: two instances with
/// the same id are the same thing, whatever their field values say.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
