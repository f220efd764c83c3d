//! Recipe book: the transformation/combination resolver the transfer and
//! processing protocols consult. Pure data, injected into the world at
//! construction; absence of a rule is how a combination "fails".

use std::collections::BTreeMap;

use contracts::{ItemKind, ProcessKind};

/// A timed transformation rule: processing `input` with `process` for
/// `duration_ticks` yields `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRule {
    pub output: ItemKind,
    pub duration_ticks: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeBook {
    transformations: BTreeMap<(ItemKind, ProcessKind), TransformRule>,
    combinations: BTreeMap<(ItemKind, ItemKind), ItemKind>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard kitchen rules: chop produce and meat, cook chopped meat,
    /// assemble salads and burgers.
    pub fn standard() -> Self {
        let mut book = Self::new();
        book.add_transformation(ItemKind::Tomato, ProcessKind::Chopping, ItemKind::ChoppedTomato, 120);
        book.add_transformation(ItemKind::Lettuce, ProcessKind::Chopping, ItemKind::ChoppedLettuce, 120);
        book.add_transformation(ItemKind::Meat, ProcessKind::Chopping, ItemKind::ChoppedMeat, 150);
        book.add_transformation(ItemKind::ChoppedMeat, ProcessKind::Cooking, ItemKind::CookedPatty, 240);
        book.add_combination(ItemKind::ChoppedTomato, ItemKind::ChoppedLettuce, ItemKind::Salad);
        book.add_combination(ItemKind::CookedPatty, ItemKind::Bread, ItemKind::Burger);
        book
    }

    pub fn add_transformation(
        &mut self,
        input: ItemKind,
        process: ProcessKind,
        output: ItemKind,
        duration_ticks: u64,
    ) {
        self.transformations.insert(
            (input, process),
            TransformRule {
                output,
                duration_ticks: duration_ticks.max(1),
            },
        );
    }

    /// Combinations are symmetric; the pair key is stored in sorted order.
    pub fn add_combination(&mut self, a: ItemKind, b: ItemKind, result: ItemKind) {
        self.combinations.insert(pair_key(a, b), result);
    }

    pub fn transformation(&self, input: ItemKind, process: ProcessKind) -> Option<&TransformRule> {
        self.transformations.get(&(input, process))
    }

    pub fn can_transform(&self, input: ItemKind, process: ProcessKind) -> bool {
        self.transformations.contains_key(&(input, process))
    }

    pub fn can_combine(&self, a: ItemKind, b: ItemKind) -> bool {
        self.combinations.contains_key(&pair_key(a, b))
    }

    pub fn combination_result(&self, a: ItemKind, b: ItemKind) -> Option<ItemKind> {
        self.combinations.get(&pair_key(a, b)).copied()
    }

    /// Whether any processing category at all applies to this item kind.
    pub fn is_processable(&self, input: ItemKind) -> bool {
        self.transformations.keys().any(|(kind, _)| *kind == input)
    }
}

fn pair_key(a: ItemKind, b: ItemKind) -> (ItemKind, ItemKind) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_book_chops_tomato() {
        let book = RecipeBook::standard();
        let rule = book
            .transformation(ItemKind::Tomato, ProcessKind::Chopping)
            .expect("rule present");
        assert_eq!(rule.output, ItemKind::ChoppedTomato);
        assert!(rule.duration_ticks > 0);
    }

    #[test]
    fn cooking_a_raw_tomato_has_no_rule() {
        let book = RecipeBook::standard();
        assert!(!book.can_transform(ItemKind::Tomato, ProcessKind::Cooking));
        assert!(book.transformation(ItemKind::Tomato, ProcessKind::Cooking).is_none());
    }

    #[test]
    fn combination_is_symmetric() {
        let book = RecipeBook::standard();
        assert!(book.can_combine(ItemKind::ChoppedTomato, ItemKind::ChoppedLettuce));
        assert!(book.can_combine(ItemKind::ChoppedLettuce, ItemKind::ChoppedTomato));
        assert_eq!(
            book.combination_result(ItemKind::Bread, ItemKind::CookedPatty),
            Some(ItemKind::Burger)
        );
    }

    #[test]
    fn absent_combination_rule_means_infeasible() {
        let book = RecipeBook::standard();
        assert!(!book.can_combine(ItemKind::Tomato, ItemKind::Bread));
        assert_eq!(book.combination_result(ItemKind::Tomato, ItemKind::Bread), None);
    }

    #[test]
    fn duration_is_clamped_to_at_least_one_tick() {
        let mut book = RecipeBook::new();
        book.add_transformation(ItemKind::Meat, ProcessKind::Cooking, ItemKind::CookedPatty, 0);
        assert_eq!(
            book.transformation(ItemKind::Meat, ProcessKind::Cooking)
                .map(|rule| rule.duration_ticks),
            Some(1)
        );
    }

    #[test]
    fn is_processable_checks_any_category() {
        let book = RecipeBook::standard();
        assert!(book.is_processable(ItemKind::ChoppedMeat));
        assert!(!book.is_processable(ItemKind::Burger));
    }
}
