//! Villager trade recipes as seen by the override resolver.

use crate::item::ItemStack;
use serde::Serialize;

/// Read-only view over a villager trade.
pub trait RecipeView {
    /// The item the player pays with (first ingredient).
    fn buy_item(&self) -> &ItemStack;

    /// The item the villager sells.
    fn sell_item(&self) -> &ItemStack;
}

/// A concrete merchant recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerchantRecipe {
    buy: ItemStack,
    sell: ItemStack,
}

impl MerchantRecipe {
    pub fn new(buy: ItemStack, sell: ItemStack) -> Self {
        Self { buy, sell }
    }
}

impl RecipeView for MerchantRecipe {
    fn buy_item(&self) -> &ItemStack {
        &self.buy
    }

    fn sell_item(&self) -> &ItemStack {
        &self.sell
    }
}
