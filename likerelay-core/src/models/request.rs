//! Like request type.

use serde::Serialize;

use crate::error::ValidationError;
use crate::validation::{validate_player_id, validate_quantity};

/// A request to send likes to one player.
///
/// Only constructible through [`LikeRequest::new`], so every instance has
/// passed validation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeRequest {
    player_id: String,
    quantity: u32,
}

impl LikeRequest {
    /// Validates the inputs and builds a request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPlayerId`] or
    /// [`ValidationError::InvalidQuantity`] when an input is out of range.
    pub fn new(player_id: impl Into<String>, quantity: i64) -> Result<Self, ValidationError> {
        let player_id = player_id.into();
        if !validate_player_id(&player_id) {
            return Err(ValidationError::InvalidPlayerId(player_id));
        }
        if !validate_quantity(quantity) {
            return Err(ValidationError::InvalidQuantity(quantity));
        }
        let quantity =
            u32::try_from(quantity).map_err(|_| ValidationError::InvalidQuantity(quantity))?;

        Ok(Self {
            player_id,
            quantity,
        })
    }

    /// The numeric player id, as supplied.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Number of likes requested.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Same player, different quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQuantity`] if `quantity` is out of range.
    pub fn with_quantity(&self, quantity: i64) -> Result<Self, ValidationError> {
        Self::new(self.player_id.clone(), quantity)
    }
}
